mod output;

pub use output::{
    display_exchange, display_notice, display_session_list, display_transcript, display_warning,
};
