//! The built-in library of named stamp shapes.
//!
//! Shapes are grouped into families: plain pencils for freehand drawing,
//! then a selection of well-known community patterns (gliders, a
//! spaceship, methuselahs, an eater, and the Gosper glider gun). Pencil
//! families are draggable, meaning a client may hold the stamp down and
//! paint continuously; single-shot families are not.

use petri_types::Pattern;

/// A single named shape within a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampShape {
    /// Display label, e.g. `"3 px"` or `"Acorn"`.
    pub label: &'static str,
    /// The shape's cell pattern.
    pub pattern: Pattern,
}

/// A group of related shapes sharing a label and drag behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampFamily {
    /// Family label, e.g. `"Glider"`.
    pub label: &'static str,
    /// Whether the stamp may be held down and painted continuously.
    pub draggable: bool,
    /// The shapes in this family.
    pub shapes: Vec<StampShape>,
}

impl StampFamily {
    /// Look up a shape in this family by label.
    #[must_use]
    pub fn shape(&self, label: &str) -> Option<&StampShape> {
        self.shapes.iter().find(|shape| shape.label == label)
    }
}

/// The default freehand pencil: a solid 3x3 block.
#[must_use]
pub fn default_pencil_pattern() -> Pattern {
    Pattern::from_art(&["XXX", "XXX", "XXX"])
}

/// Build the full built-in catalog.
///
/// The glider and spaceship variants are distinct orientations (some are
/// reflections, not rotations of one another), so each is stored as
/// explicit art rather than derived via [`Pattern::rotate_cw`].
#[must_use]
pub fn builtin_catalog() -> Vec<StampFamily> {
    vec![
        StampFamily {
            label: "Pencil",
            draggable: true,
            shapes: vec![
                shape("1 px", &["X"]),
                shape("2 px", &["XX", "XX"]),
                StampShape {
                    label: "3 px",
                    pattern: default_pencil_pattern(),
                },
                shape("5 px", &["XXXXX", "XXXXX", "XXXXX", "XXXXX", "XXXXX"]),
            ],
        },
        StampFamily {
            label: "Glider",
            draggable: false,
            shapes: vec![
                shape("\u{2198}", &[".X.", "..X", "XXX"]),
                shape("\u{2197}", &["XXX", "..X", ".X."]),
                shape("\u{2199}", &[".X.", "X..", "XXX"]),
                shape("\u{2196}", &["XXX", "X..", ".X."]),
            ],
        },
        StampFamily {
            label: "Spaceship",
            draggable: false,
            shapes: vec![
                shape("\u{2192}", &[".XXXX", "X...X", "....X", "X..X."]),
                shape("\u{2b05}", &["XXXX.", "X...X", "X....", ".X..X"]),
            ],
        },
        StampFamily {
            label: "Methuselahs",
            draggable: false,
            shapes: vec![
                shape("The R-pentomino", &[".XX", "XX.", ".X."]),
                shape("Diehard", &["......X.", "XX......", ".X...XXX"]),
                shape("Acorn", &[".X.....", "...X...", "XX..XXX"]),
            ],
        },
        StampFamily {
            label: "Eater",
            draggable: false,
            shapes: vec![shape("\u{2196}", &["XX..", "X.X.", "..X.", "..XX"])],
        },
        StampFamily {
            label: "Generators",
            draggable: false,
            shapes: vec![shape(
                "Gosper glider gun \u{2198}",
                &[
                    "........................X...........",
                    "......................X.X...........",
                    "............XX......XX............XX",
                    "...........X...X....XX............XX",
                    "XX........X.....X...XX..............",
                    "XX........X...X.XX....X.X...........",
                    "..........X.....X.......X...........",
                    "...........X...X....................",
                    "............XX......................",
                ],
            )],
        },
    ]
}

/// Look up a family in the catalog by label.
#[must_use]
pub fn family<'a>(catalog: &'a [StampFamily], label: &str) -> Option<&'a StampFamily> {
    catalog.iter().find(|f| f.label == label)
}

fn shape(label: &'static str, art: &[&str]) -> StampShape {
    StampShape {
        label,
        pattern: Pattern::from_art(art),
    }
}
