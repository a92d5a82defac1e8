pub mod ffmpeg;
pub mod http;
pub mod llm;
pub mod onnx;
