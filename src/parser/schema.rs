//! The questionnaire's fixed layout, as data.
//!
//! Every literal label, heading and container id the extractors rely on lives in
//! [`FORM`]. The generic driver in [`super::extract`] interprets it, so a renamed
//! label in the source form is a one-line change here.

/// Where an extraction starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `<label>` with exactly this (whitespace-normalized) text.
    Label(&'static str),
    /// Section heading with exactly this text.
    Heading(&'static str),
    /// Bare text node, e.g. "Number of series:".
    Prompt(&'static str),
    /// Element with this `id`.
    Id(&'static str),
    /// `<textarea>` with this placeholder; the anchor is the value itself.
    Placeholder(&'static str),
}

/// What one step pulls out, relative to the anchor or the previous step's control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Next textarea, trimmed text.
    Text,
    /// The anchor's own text.
    Own,
    /// Next textarea, one entry per non-blank line.
    Lines,
    /// Next textarea parsed as a `Key: Value` block.
    Address,
    /// Next select, selected option.
    Choice,
    /// Every select inside the anchor, selected non-empty options.
    Choices,
    /// Select inside the paragraph that starts with this marker.
    Marked(&'static str),
    /// Textarea of the trailing "Other:" paragraph.
    Other,
}

pub const OTHER_MARKER: &str = "Other:";

/// Keys every address-like block carries, in output order.
pub const ADDRESS_KEYS: &[&str] = &["Name", "Address", "Postal code, city", "Country", "WEB"];

/// One anchored run of steps. Steps share a cursor: each starts where the previous
/// one found its control, so positional groups stay positional.
#[derive(Debug)]
pub struct Field {
    pub anchor: Anchor,
    pub steps: &'static [(&'static str, Pattern)],
    /// Wrap the step outputs in a sub-map under this key instead of inlining them.
    pub nest: Option<&'static str>,
}

/// Repeated entries: every `row` inside the container becomes one sub-record.
#[derive(Debug)]
pub struct RowGroup {
    pub container: &'static str,
    /// (textarea class, output key)
    pub columns: &'static [(&'static str, &'static str)],
}

#[derive(Debug)]
pub enum Body {
    Map(&'static [Field]),
    Rows(RowGroup),
    Value { anchor: Anchor, pattern: Pattern },
}

#[derive(Debug)]
pub struct Section {
    pub key: &'static str,
    /// Heading that must be present for the section to be read; `None` reads the
    /// whole document.
    pub heading: Option<&'static str>,
    pub body: Body,
}

const fn field(anchor: Anchor, steps: &'static [(&'static str, Pattern)]) -> Field {
    Field {
        anchor,
        steps,
        nest: None,
    }
}

const fn nested(
    anchor: Anchor,
    key: &'static str,
    steps: &'static [(&'static str, Pattern)],
) -> Field {
    Field {
        anchor,
        steps,
        nest: Some(key),
    }
}

use Pattern::{Address, Choice, Choices, Lines, Marked, Other, Own, Text};

const FILM: &[Field] = &[
    field(
        Anchor::Label("Title"),
        &[("Title_Original", Text), ("Title_English", Text), ("Title_Other", Text)],
    ),
    field(
        Anchor::Label("Language"),
        &[("Language_Original", Text), ("Language_Subtitles", Text)],
    ),
    field(Anchor::Label("Country of production"), &[("Country_of_production", Text)]),
    field(Anchor::Label("Date of completion"), &[("Date_of_completion", Text)]),
    field(
        Anchor::Label("Runtime (for the series average value)"),
        &[("Runtime", Text)],
    ),
    field(Anchor::Prompt("Number of series:"), &[("Number_of_series", Text)]),
    field(Anchor::Prompt("Number of episodes:"), &[("Number_of_episodes", Text)]),
    field(
        Anchor::Placeholder("S1E1: Name of episode (running time)"),
        &[("Titles_and_runtime_of_episodes", Own)],
    ),
    field(Anchor::Label("First film?"), &[("First_Film", Choice)]),
    field(
        Anchor::Id("genre-container"),
        &[("Genre_List", Choices), ("Genre_Other", Other)],
    ),
    field(Anchor::Label("Keywords (story topics)"), &[("Keywords", Text)]),
    nested(
        Anchor::Label("Target group"),
        "Target_Group",
        &[("Rating", Choice), ("Audience", Choice), ("Other", Other)],
    ),
];

const CREW: &[Field] = &[
    field(Anchor::Label("Director(s):"), &[("Director(s)", Text)]),
    field(Anchor::Label("Screenplay writer(s):"), &[("Screenplay_writer(s)", Text)]),
    field(
        Anchor::Label("Director(s) of Photography:"),
        &[("Director(s)_of_Photography", Text)],
    ),
    field(Anchor::Label("Editor(s):"), &[("Editor(s)", Text)]),
    field(Anchor::Label("Sound director(s):"), &[("Sound_director(s)", Text)]),
    field(Anchor::Label("Art director(s):"), &[("Art_director(s)", Text)]),
    field(Anchor::Label("Music composer(s):"), &[("Music_composer(s)", Text)]),
    field(Anchor::Label("Cast (actor's name: role):"), &[("Cast", Lines)]),
];

const DIRECTOR_BIO: &[Field] = &[
    field(Anchor::Label("Date of birth:"), &[("Date_of_birth", Text)]),
    field(Anchor::Label("Max. 500 characters:"), &[("Bio_Text", Text)]),
];

const TECHNICAL: &[Field] = &[
    nested(
        Anchor::Label("Shooting format"),
        "Shooting_Format",
        &[("Film", Choice), ("Video", Choice), ("Other", Other)],
    ),
    field(Anchor::Label("Camera:"), &[("Camera", Text)]),
    field(Anchor::Label("Anamorphic lens:"), &[("Anamorphic_Lens", Choice)]),
    field(
        Anchor::Label("Animation technique"),
        &[("Animation_Technique", Choice), ("Animation_Technique_Other", Other)],
    ),
    field(Anchor::Label("Video editing software"), &[("Video_Editing_Software", Text)]),
    field(
        Anchor::Label("Digital audio workstation"),
        &[("Digital_Audio_Workstation", Text)],
    ),
    nested(
        Anchor::Label("Screening format"),
        "Screening_Format",
        &[("Film", Choice), ("Tape", Choice), ("File", Choice), ("Other", Other)],
    ),
    field(
        Anchor::Label("Resolution"),
        &[("Resolution", Choice), ("Resolution_Other", Other)],
    ),
    nested(
        Anchor::Label("Speed"),
        "Speed",
        &[
            ("Scan_Method", Choice),
            ("FPS", Marked("FPS (frame per second):")),
            ("FPS_Other", Other),
        ],
    ),
    field(
        Anchor::Label("Aspect ratio"),
        &[("Aspect_Ratio", Choice), ("Aspect_Ratio_Other", Other)],
    ),
    field(
        Anchor::Label("Sound mix"),
        &[("Sound_Mix", Choice), ("Sound_Mix_Other", Other)],
    ),
    field(Anchor::Label("Colour"), &[("Colour", Choice)]),
    field(Anchor::Label("Notes"), &[("Notes", Text)]),
];

const PRODUCTION: &[Field] = &[
    field(Anchor::Label("Producers:"), &[("Producers", Address)]),
    field(Anchor::Label("Production company:"), &[("Production_Company", Address)]),
    field(Anchor::Label("Co-producer:"), &[("Co_Producer", Address)]),
];

/// Top-level record layout, in output order.
pub const FORM: &[Section] = &[
    Section {
        key: "Film",
        heading: Some("1. Film"),
        body: Body::Map(FILM),
    },
    Section {
        key: "Premiere",
        heading: Some("2. Premiere"),
        body: Body::Rows(RowGroup {
            container: "premiere-container",
            columns: &[
                ("date", "Date"),
                ("country", "Country"),
                ("festival", "Name_of_place_of_premiere"),
            ],
        }),
    },
    Section {
        key: "Festivals",
        heading: Some("3. Festivals"),
        body: Body::Rows(RowGroup {
            container: "festival-container",
            columns: &[
                ("date", "Date"),
                ("country", "Country"),
                ("festival", "Name_of_Festival"),
            ],
        }),
    },
    Section {
        key: "Awards",
        heading: Some("4. Awards"),
        body: Body::Rows(RowGroup {
            container: "awards-container",
            columns: &[
                ("date", "Date"),
                ("country", "Country"),
                ("festival", "Festival_Section_of_Competition"),
            ],
        }),
    },
    Section {
        key: "Logline",
        heading: None,
        body: Body::Value {
            anchor: Anchor::Heading("5. Logline (max. 150 characters)"),
            pattern: Text,
        },
    },
    Section {
        key: "Synopsis",
        heading: None,
        body: Body::Value {
            anchor: Anchor::Heading("6. Synopsis (max. 350 characters)"),
            pattern: Text,
        },
    },
    Section {
        key: "Directors_Note",
        heading: None,
        body: Body::Value {
            anchor: Anchor::Heading("7. Director's note (max. 500 characters)"),
            pattern: Text,
        },
    },
    Section {
        key: "Crew",
        heading: Some("8. Crew"),
        body: Body::Map(CREW),
    },
    Section {
        key: "Director_Bio",
        heading: None,
        body: Body::Map(DIRECTOR_BIO),
    },
    Section {
        key: "Director_Filmography",
        heading: None,
        body: Body::Value {
            anchor: Anchor::Heading("10. Director's filmography"),
            pattern: Lines,
        },
    },
    Section {
        key: "Technical_Details",
        heading: Some("11. Technical details"),
        body: Body::Map(TECHNICAL),
    },
    Section {
        key: "Production",
        heading: Some("12. Production"),
        body: Body::Map(PRODUCTION),
    },
];

// ── Tests ──
