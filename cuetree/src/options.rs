/// Options recognized by [`parse_captions`](crate::parse_captions) and the
/// cue markup tokenizer.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Tokenize cue payloads into a [`CueStructure`](crate::CueStructure).
    /// When disabled, the raw joined payload text is stored on the cue
    /// instead.
    pub process_cue_html: bool,

    /// Enforce the WebVTT tag allow-list and escape text runs. When
    /// disabled, every tag passes through as a raw structural node.
    pub sanitise_cue_html: bool,

    /// Suppress newline to `<br />` conversion in sanitized text runs.
    pub ignore_whitespace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            process_cue_html: true,
            sanitise_cue_html: true,
            ignore_whitespace: false,
        }
    }
}
