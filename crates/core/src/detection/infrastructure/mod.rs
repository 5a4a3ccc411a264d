pub mod fail_closed_detector;
pub mod onnx_yolo_detector;
