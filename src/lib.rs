//! Sprite Composer - asset preparation for Game Boy Color sprite imports
//!
//! This library provides functionality to:
//! - Normalize color keys and clear the white border of a sprite
//! - Infer the 2-color shiny palette of a sprite and recolor sprites with it
//! - Split an animated GIF into a spritesheet and a frame-timing listing
//! - Pack a converted sprite set into import bundles

pub mod anim;
pub mod bundle;
pub mod cli;
pub mod color;
pub mod config;
pub mod fixup;
pub mod output;
pub mod shiny;
pub mod spritesheet;
