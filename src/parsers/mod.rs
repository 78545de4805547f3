pub mod html;


pub use html::Document;
