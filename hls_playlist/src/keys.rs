//! Attribute keys used by the built-in tags.

/// Where single-value and array parsers store a tag's value.
pub const VALUE: &str = "VALUE";

/// `#EXTINF` duration.
pub const DURATION: &str = "DURATION";
/// `#EXTINF` title, present only when the source had one.
pub const TITLE: &str = "TITLE";

pub const ASSOC_LANGUAGE: &str = "ASSOC-LANGUAGE";
pub const AUDIO: &str = "AUDIO";
pub const AUTOSELECT: &str = "AUTOSELECT";
pub const AVERAGE_BANDWIDTH: &str = "AVERAGE-BANDWIDTH";
pub const BANDWIDTH: &str = "BANDWIDTH";
pub const BYTERANGE: &str = "BYTERANGE";
pub const CHANNELS: &str = "CHANNELS";
pub const CHARACTERISTICS: &str = "CHARACTERISTICS";
pub const CLASS: &str = "CLASS";
pub const CLOSED_CAPTIONS: &str = "CLOSED-CAPTIONS";
pub const CODECS: &str = "CODECS";
pub const DATA_ID: &str = "DATA-ID";
pub const DEFAULT: &str = "DEFAULT";
pub const END_DATE: &str = "END-DATE";
pub const FORCED: &str = "FORCED";
pub const FRAME_RATE: &str = "FRAME-RATE";
pub const GROUP_ID: &str = "GROUP-ID";
pub const HDCP_LEVEL: &str = "HDCP-LEVEL";
pub const ID: &str = "ID";
pub const INSTREAM_ID: &str = "INSTREAM-ID";
pub const IV: &str = "IV";
pub const KEYFORMAT: &str = "KEYFORMAT";
pub const KEYFORMATVERSIONS: &str = "KEYFORMATVERSIONS";
pub const LANGUAGE: &str = "LANGUAGE";
pub const METHOD: &str = "METHOD";
pub const NAME: &str = "NAME";
pub const PLANNED_DURATION: &str = "PLANNED-DURATION";
pub const PRECISE: &str = "PRECISE";
pub const PROGRAM_ID: &str = "PROGRAM-ID";
pub const RESOLUTION: &str = "RESOLUTION";
pub const START_DATE: &str = "START-DATE";
pub const SUBTITLES: &str = "SUBTITLES";
pub const TIME_OFFSET: &str = "TIME-OFFSET";
pub const TYPE: &str = "TYPE";
pub const URI: &str = "URI";
pub const VIDEO: &str = "VIDEO";
