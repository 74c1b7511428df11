use clap::ValueEnum;
use pubint_page_range::SpanPolicy;

#[derive(Copy, Clone, Default, ValueEnum)]
pub(crate) enum SpanPolicyFlag {
    #[default]
    Propagate,
    Repair,
    Strict,
}

impl SpanPolicyFlag {
    pub(crate) const fn as_domain(self) -> SpanPolicy {
        match self {
            SpanPolicyFlag::Propagate => SpanPolicy::Propagate,
            SpanPolicyFlag::Repair => SpanPolicy::Repair,
            SpanPolicyFlag::Strict => SpanPolicy::Strict,
        }
    }
}

#[derive(Copy, Clone, Default, ValueEnum)]
pub(crate) enum PagesFormatFlag {
    #[default]
    Display,
    Json,
    Stats,
    Segments,
}

impl PagesFormatFlag {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            PagesFormatFlag::Display => "display",
            PagesFormatFlag::Json => "json",
            PagesFormatFlag::Stats => "stats",
            PagesFormatFlag::Segments => "segments",
        }
    }
}
