//! Workspace-level tests: arena and JSON interop, selection and rewriting
//! through the public API, and end-to-end execution of instrumented trees.

#[cfg(test)]
mod end_to_end;
#[cfg(test)]
mod transform;
