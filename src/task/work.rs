/*!
 * Work Trait
 * Executable unit wrapped by a priority task
 */

/// Something that can be run exactly once
pub trait Work {
    type Output;

    fn call(self) -> Self::Output;
}

impl<F, R> Work for F
where
    F: FnOnce() -> R,
{
    type Output = R;

    #[inline]
    fn call(self) -> R {
        self()
    }
}
