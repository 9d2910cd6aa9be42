pub(crate) mod demo_data;
pub(crate) mod exam_window;
pub(crate) mod results;
pub(crate) mod scoring;
