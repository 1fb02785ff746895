pub mod process;
pub mod toolchain;
