use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Colours handed out by [`Palette::for_labels`], in order.
pub const DEFAULT_COLORS: [Rgb; 6] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStyle {
    pub label: String,
    pub color: Rgb,
}

/// How each label is drawn. Built once and passed to whatever renders
/// grouped output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub styles: Vec<GroupStyle>,
}

impl Palette {
    pub fn iris() -> Self {
        let styles = ["Iris-setosa", "Iris-versicolor", "Iris-virginica"]
            .iter()
            .zip(DEFAULT_COLORS.iter())
            .map(|(label, color)| GroupStyle {
                label: label.to_string(),
                color: *color,
            })
            .collect();
        Self { styles }
    }

    /// One style per label, cycling through [`DEFAULT_COLORS`].
    pub fn for_labels(labels: &[String]) -> Self {
        let styles = labels
            .iter()
            .zip(DEFAULT_COLORS.iter().cycle())
            .map(|(label, color)| GroupStyle {
                label: label.clone(),
                color: *color,
            })
            .collect();
        Self { styles }
    }

    pub fn color(&self, label: &str) -> Option<Rgb> {
        self.styles
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.color)
    }
}
