pub mod form;
pub mod hash;
pub mod html;
pub mod jwt;
