/// Native module contains implementations of core traits that talk to
/// the host directly: toolchain binaries are spawned as plain child
/// processes, without a container or sandbox in between.
pub mod process;
