//! Arity-generic kernel parameter packs and routine entry points
//!
//! Accelerators load flat functions of the form `fn(coords, args)`; kernel
//! authors write typed routines of the form `fn(index, p1, .., pN)`. The two
//! traits here bridge the gap once per arity:
//!
//! - [`KernelParams`] encodes a typed parameter tuple into the erased
//!   argument pack a launch submits.
//! - [`KernelRoutine`] gives a routine a statically compiled entry point
//!   that decodes that pack and calls the routine, one thread at a time.
//!
//! Both are implemented for every arity from zero through fourteen by the
//! macro at the bottom. A routine only gets an entry point if its type is
//! zero-sized; callables carrying captured state have nothing to compile
//! statically and are rejected during resolution instead.

use std::ptr::NonNull;

use refract_runtime::{KernelArgs, KernelEntry, KernelIndex, KernelParam, Result};

/// Typed parameter tuple of a kernel routine
///
/// Implemented for tuples `(P1, .., PN)` of [`KernelParam`] types up to
/// arity fourteen, and for `()` for index-only routines.
pub trait KernelParams: Copy + Send + Sync + 'static {
    /// Number of parameters in the pack
    const ARITY: usize;

    /// Encode every parameter into an erased argument pack, in positional order
    fn encode(&self) -> KernelArgs;
}

/// A callable usable as a kernel routine over index type `I` and parameter
/// pack `P`
///
/// Blanket-implemented for every `Fn(I, P1, .., PN)` that is `Send + Sync +
/// 'static`. The entry point is only valid for zero-sized callables; see
/// [`crate::KernelSource::new`] for where that distinction is made.
pub trait KernelRoutine<I: KernelIndex, P: KernelParams>: Send + Sync + Sized + 'static {
    /// Statically compiled entry point for this routine
    fn entry() -> KernelEntry;

    /// Routine name, derived from the function's type path
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Materialize a reference to a zero-sized callable.
///
/// # Safety
///
/// `F` must be zero-sized. Every well-aligned pointer is a valid reference
/// to a zero-sized value, so a dangling `NonNull` suffices.
unsafe fn zst_ref<'a, F>() -> &'a F {
    debug_assert_eq!(std::mem::size_of::<F>(), 0);
    unsafe { NonNull::<F>::dangling().as_ref() }
}

impl KernelParams for () {
    const ARITY: usize = 0;

    fn encode(&self) -> KernelArgs {
        KernelArgs::new()
    }
}

fn trampoline0<I, F>(coords: [usize; 3], _args: &KernelArgs) -> Result<()>
where
    I: KernelIndex,
    F: Fn(I) + Send + Sync + 'static,
{
    let routine: &F = unsafe { zst_ref::<F>() };
    routine(I::from_coords(coords));
    Ok(())
}

impl<I, F> KernelRoutine<I, ()> for F
where
    I: KernelIndex,
    F: Fn(I) + Send + Sync + 'static,
{
    fn entry() -> KernelEntry {
        trampoline0::<I, F>
    }
}

// One KernelParams impl, one trampoline, and one KernelRoutine impl per
// arity. Slot indices are positional: parameter k decodes from slot k.
macro_rules! impl_kernel_arity {
    ($arity:literal, $trampoline:ident => $(($P:ident, $p:ident, $idx:tt)),+) => {
        impl<$($P: KernelParam),+> KernelParams for ($($P,)+) {
            const ARITY: usize = $arity;

            fn encode(&self) -> KernelArgs {
                let ($($p,)+) = self;
                let mut args = KernelArgs::with_capacity($arity);
                $(args.push($p.encode());)+
                args
            }
        }

        fn $trampoline<I, F, $($P),+>(coords: [usize; 3], args: &KernelArgs) -> Result<()>
        where
            I: KernelIndex,
            F: Fn(I, $($P),+) + Send + Sync + 'static,
            $($P: KernelParam,)+
        {
            let routine: &F = unsafe { zst_ref::<F>() };
            let index = I::from_coords(coords);
            $(let $p = <$P as KernelParam>::decode(args.slot($idx)?, $idx)?;)+
            routine(index, $($p),+);
            Ok(())
        }

        impl<I, F, $($P),+> KernelRoutine<I, ($($P,)+)> for F
        where
            I: KernelIndex,
            F: Fn(I, $($P),+) + Send + Sync + 'static,
            $($P: KernelParam,)+
        {
            fn entry() -> KernelEntry {
                $trampoline::<I, F, $($P),+>
            }
        }
    };
}

impl_kernel_arity!(1, trampoline1 => (P1, p1, 0));
impl_kernel_arity!(2, trampoline2 => (P1, p1, 0), (P2, p2, 1));
impl_kernel_arity!(3, trampoline3 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2));
impl_kernel_arity!(4, trampoline4 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3));
impl_kernel_arity!(5, trampoline5 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4));
impl_kernel_arity!(6, trampoline6 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4),
    (P6, p6, 5));
impl_kernel_arity!(7, trampoline7 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4),
    (P6, p6, 5), (P7, p7, 6));
impl_kernel_arity!(8, trampoline8 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4),
    (P6, p6, 5), (P7, p7, 6), (P8, p8, 7));
impl_kernel_arity!(9, trampoline9 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4),
    (P6, p6, 5), (P7, p7, 6), (P8, p8, 7), (P9, p9, 8));
impl_kernel_arity!(10, trampoline10 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4),
    (P6, p6, 5), (P7, p7, 6), (P8, p8, 7), (P9, p9, 8), (P10, p10, 9));
impl_kernel_arity!(11, trampoline11 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4),
    (P6, p6, 5), (P7, p7, 6), (P8, p8, 7), (P9, p9, 8), (P10, p10, 9), (P11, p11, 10));
impl_kernel_arity!(12, trampoline12 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4),
    (P6, p6, 5), (P7, p7, 6), (P8, p8, 7), (P9, p9, 8), (P10, p10, 9), (P11, p11, 10), (P12, p12, 11));
impl_kernel_arity!(13, trampoline13 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4),
    (P6, p6, 5), (P7, p7, 6), (P8, p8, 7), (P9, p9, 8), (P10, p10, 9), (P11, p11, 10), (P12, p12, 11),
    (P13, p13, 12));
impl_kernel_arity!(14, trampoline14 => (P1, p1, 0), (P2, p2, 1), (P3, p3, 2), (P4, p4, 3), (P5, p5, 4),
    (P6, p6, 5), (P7, p7, 6), (P8, p8, 7), (P9, p9, 8), (P10, p10, 9), (P11, p11, 10), (P12, p12, 11),
    (P13, p13, 12), (P14, p14, 13));

// ================================================================================================
// Tests
// ================================================================================================
