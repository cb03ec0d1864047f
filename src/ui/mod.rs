pub mod modern;
pub mod pipe;
pub mod styles;
pub mod view;
