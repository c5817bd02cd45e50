//! Backend files compiled into the binary.
//!
//! The sources live under `engines/<name>/` in the package.

/// Templates and static resources of one backend.
pub struct Bundle {
    pub document: &'static str,
    pub outline: &'static str,
    /// Resource files keyed by their path inside the output directory
    pub resources: &'static [(&'static str, &'static [u8])],
}

pub static FLOWTIME: Bundle = Bundle {
    document: include_str!("../../engines/flowtime/templates/document.html"),
    outline: include_str!("../../engines/flowtime/templates/outline.html"),
    resources: &[(
        "css/cadeau.css",
        include_bytes!("../../engines/flowtime/css/cadeau.css") as &[u8],
    )],
};

pub static REVEAL: Bundle = Bundle {
    document: include_str!("../../engines/reveal/templates/document.html"),
    outline: include_str!("../../engines/reveal/templates/outline.html"),
    resources: &[(
        "css/cadeau.css",
        include_bytes!("../../engines/reveal/css/cadeau.css") as &[u8],
    )],
};

pub static SCROLLDECK: Bundle = Bundle {
    document: include_str!("../../engines/scrolldeck/templates/document.html"),
    outline: include_str!("../../engines/scrolldeck/templates/outline.html"),
    resources: &[
        (
            "css/cadeau.css",
            include_bytes!("../../engines/scrolldeck/css/cadeau.css") as &[u8],
        ),
        (
            "css/scrolldeck.css",
            include_bytes!("../../engines/scrolldeck/css/scrolldeck.css") as &[u8],
        ),
        (
            "js/scrolldeck.js",
            include_bytes!("../../engines/scrolldeck/js/scrolldeck.js") as &[u8],
        ),
    ],
};
