pub mod docx;
pub mod html;
pub mod latex;
