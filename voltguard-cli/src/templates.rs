//! Embedded starter spec templates for `voltguard init`.

const TEMPLATES: &[(&str, &str)] = &[
    ("2wd-clean", include_str!("../templates/2wd-clean.yaml")),
    ("2wd-problem", include_str!("../templates/2wd-problem.yaml")),
];

/// Sorted list of available template names.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = TEMPLATES.iter().map(|(name, _)| *name).collect();
    names.sort_unstable();
    names
}

/// Template contents for `name`, if it exists.
pub fn load(name: &str) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, data)| *data)
}
