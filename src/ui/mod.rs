pub mod gamepad;
pub mod input;
pub mod layout;
pub mod pointer;
pub mod renderer;
pub mod sound;
