//! Runtime options threaded through the resolver, interpreter, sink and
//! mutation engine.

/// Nesting limit applied when no other limit is configured.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Serialization used when rendering a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One scalar per line, for shell scripts
    #[default]
    Text,
    /// Canonical config text (`key = value;`)
    Config,
    Json,
    JsonCompact,
    Yaml,
    Msgpack,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Config => "config",
            OutputFormat::Json => "json",
            OutputFormat::JsonCompact => "compact json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Msgpack => "msgpack",
        }
    }

    /// Whether the format is delegated to a structured emitter.
    pub fn is_structured(self) -> bool {
        self != OutputFormat::Text
    }
}

/// Options for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Separates path segments in requested paths and command chains
    pub input_delimiter: char,
    /// Replaces `input_delimiter` in printed key labels
    pub output_delimiter: char,
    pub format: OutputFormat,
    /// Prefix output with `path=`
    pub show_keys: bool,
    /// Print strings without quotes
    pub raw: bool,
    /// Separate text output with spaces instead of newlines
    pub nonewline: bool,
    /// Let `recurse` add `_length` and `_keys` pseudo-fields
    pub expand: bool,
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            input_delimiter: '.',
            output_delimiter: '.',
            format: OutputFormat::Text,
            show_keys: false,
            raw: false,
            nonewline: false,
            expand: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    /// Use `delimiter` for both input paths and printed labels.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.input_delimiter = delimiter;
        self.output_delimiter = delimiter;
        self
    }

    /// Print labels with underscores so they are valid shell variable names.
    pub fn with_shellvars(mut self) -> Self {
        self.output_delimiter = '_';
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}
