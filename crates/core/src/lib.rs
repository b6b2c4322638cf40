//! Real-time face alignment: detect one face, locate its eyes, check the
//! geometry and warp the face into a canonical upright crop.

pub mod shared {
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod geometry;
    pub mod model_resolver;
    pub mod onnx_session;
    pub mod region;
}

pub mod alignment {
    pub mod alignment_target;
    pub mod face_aligner;
    pub mod similarity_transform;
}

pub mod detection {
    pub mod domain {
        pub mod cascade_classifier;
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod landmarks {
    pub mod domain {
        pub mod eye_locator;
        pub mod face_landmarks;
        pub mod landmark_model;
    }
    pub mod infrastructure;
}

pub mod validation {
    pub mod detection_validator;
}

pub mod annotation {
    pub mod frame_annotator;
}

pub mod pipeline {
    pub mod face_alignment_pipeline;
    pub mod frame_metrics;
    pub mod pipeline_logger;
    pub mod pipeline_settings;
    pub mod run_stream_use_case;
}

pub mod video {
    pub mod domain {
        pub mod frame_sink;
        pub mod frame_source;
    }
    pub mod infrastructure {
        pub mod ffmpeg_frame_source;
        pub mod image_directory_sink;
        pub mod image_file_source;
    }
}
