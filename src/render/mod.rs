//! Output rendering: static chart and GIF animations

pub mod animation;
pub mod chart;
