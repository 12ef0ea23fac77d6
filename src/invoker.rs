// SPDX-License-Identifier: Apache-2.0

//! The seams between the script executor and the outside world: the design
//! being transformed and whatever carries out one named operation on it.

use crate::script::Invocation;

/// A design the executor can drive. The executor never looks inside it; it
/// only asks whether a run may start.
pub trait DesignHandle {
    /// Returns a description of what is missing when the design is not in a
    /// state a script can start from (e.g. nothing has been read yet).
    fn check_ready(&self) -> Result<(), String>;
}

/// Performs one invocation against a design. An `Err` aborts the run; it is
/// never retried.
pub trait OperationInvoker<D: ?Sized> {
    fn invoke(&mut self, design: &mut D, invocation: &Invocation) -> Result<(), String>;
}

impl<D: ?Sized, F> OperationInvoker<D> for F
where
    F: FnMut(&mut D, &Invocation) -> Result<(), String>,
{
    fn invoke(&mut self, design: &mut D, invocation: &Invocation) -> Result<(), String> {
        self(design, invocation)
    }
}
