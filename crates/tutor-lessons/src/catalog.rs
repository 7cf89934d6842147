//! The built-in lesson catalog.
//!
//! The catalog is an immutable static configuration table loaded once at
//! startup: three units of beginner Excel lessons, each with a seed prompt
//! used to kick off the topic as a user turn. Seed text is never exposed
//! through the catalog listing endpoint.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Serialize;

/// The fixed system prompt used for every upstream request.
pub const SYSTEM_PROMPT: &str = "You are \"Dad's Excel Tutor,\" a calm, patient AI teacher for a 70-year-old accountant who is a visual learner and new to computers.\n\
Language: English only.\n\
Platform: Windows 10/11 only.\n\
Style: Numbered, step-by-step instructions with short sentences and simple words. Avoid jargon unless you define it immediately.\n\
Visual guidance: Describe what to look for on screen (e.g., \"A green 'Home' tab at the top\").\n\
Pacing: One concept at a time. Include a \"Try it\" micro-exercise when teaching. When the user finishes a mini-lesson, offer a 3-question quiz (2 multiple-choice + 1 short action task).\n\
Excel level: Absolute beginner.\n\
Clarity rules: Never approximate numbers. If uncertain, say so and propose a safe next step.\n\
Safety: Never ask for or display API keys or private info.";

/// A static catalog entry for one lesson.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Lesson {
    /// Stable identifier used in URLs, storage keys, and chat requests.
    pub id: &'static str,
    /// Short display title.
    pub title: &'static str,
    /// One-line summary shown in the lesson list.
    pub summary: &'static str,
    /// Learning objectives for the lesson.
    pub objectives: &'static [&'static str],
    /// Fixed instructional prompt injected as a user turn to kick off the
    /// topic. Not exposed through the catalog listing.
    #[serde(skip)]
    pub seed: &'static str,
}

/// A group of related lessons.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Unit {
    /// Stable unit identifier.
    pub id: &'static str,
    /// Display title for the unit heading.
    pub title: &'static str,
    /// Lessons in teaching order.
    pub lessons: &'static [Lesson],
}

/// The lesson catalog: an ordered list of units.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    units: &'static [Unit],
}

/// Catalog listing entry with the seed text stripped.
#[derive(Debug, Clone, Serialize)]
pub struct LessonSummary {
    /// Short display title.
    pub title: &'static str,
    /// One-line summary.
    pub summary: &'static str,
}

static UNITS: &[Unit] = &[
    Unit {
        id: "A",
        title: "Unit A — Foundations",
        lessons: &[
            Lesson {
                id: "orientation",
                title: "Orientation",
                summary: "Workbook vs. worksheet; rows/columns/cells; the Ribbon; saving a file.",
                objectives: &[
                    "Understand workbook vs worksheet",
                    "Navigate rows/columns/cells",
                    "Use the Ribbon interface",
                    "Save a file properly",
                ],
                seed: "Teach the very first Excel lesson on Windows. Explain workbook, worksheet, rows, columns, cells, the Ribbon, and saving a file. Include a 5-step hands-on practice and then a 3-question quiz.",
            },
            Lesson {
                id: "navigation",
                title: "Navigation & selection",
                summary: "Entering text/numbers; basic file management.",
                objectives: &[
                    "Move with arrow keys",
                    "Select cells",
                    "Enter text and numbers",
                    "Basic file management",
                ],
                seed: "Teach moving with arrow keys, selecting cells, typing text/numbers, and saving with a clear file name. Include a tiny practice table and a 3-question quiz.",
            },
            Lesson {
                id: "formatting",
                title: "Formatting basics",
                summary: "Bold, borders, column width, row height, number formats.",
                objectives: &[
                    "Apply bold formatting",
                    "Add borders",
                    "Adjust column width and row height",
                    "Set number formats",
                ],
                seed: "Teach bold, borders, column width, row height, and number formats. Include an exact mini-table and a 3-question quiz.",
            },
        ],
    },
    Unit {
        id: "B",
        title: "Unit B — Core Skills",
        lessons: &[
            Lesson {
                id: "formulas1",
                title: "Formulas 1",
                summary: "=SUM, =AVERAGE (exact keystrokes).",
                objectives: &[
                    "Enter =SUM formula with exact keystrokes",
                    "Enter =AVERAGE formula",
                    "Work with cell ranges",
                    "Understand basic formula structure",
                ],
                seed: "Teach `=SUM` and `=AVERAGE` with exact keystrokes. Provide a tiny dataset, compute totals/averages, then a 3-question quiz.",
            },
            Lesson {
                id: "autofill",
                title: "Autofill & relative references",
                summary: "Copying formulas safely.",
                objectives: &[
                    "Use Autofill handle",
                    "Understand relative references",
                    "Copy formulas safely",
                    "Recognize formula patterns",
                ],
                seed: "Teach Autofill handle, relative references, and safe copying of formulas. Include a small table and a 3-question quiz.",
            },
            Lesson {
                id: "sortfilter",
                title: "Sort & Filter",
                summary: "Turn on Filter, sort A→Z, filter by value.",
                objectives: &[
                    "Enable Filter feature",
                    "Sort data A→Z",
                    "Filter by specific values",
                    "Understand data organization",
                ],
                seed: "Teach turning on Filter, sorting A→Z, and filtering by value. Include a small sample and a 3-question quiz.",
            },
        ],
    },
    Unit {
        id: "C",
        title: "Unit C — Presenting & Printing",
        lessons: &[
            Lesson {
                id: "charts",
                title: "Intro charts",
                summary: "Build a Column chart from a 2-column table.",
                objectives: &[
                    "Select data for charts",
                    "Insert Column chart",
                    "Understand chart basics",
                    "Format chart elements",
                ],
                seed: "Teach inserting a Column chart from a 2-column table. Provide the sample data and a 3-question quiz.",
            },
            Lesson {
                id: "printing",
                title: "Printing basics",
                summary: "Print Preview, orientation, margins, fit to one page.",
                objectives: &[
                    "Use Print Preview",
                    "Set page orientation",
                    "Adjust margins",
                    "Fit content to one page",
                ],
                seed: "Teach Print Preview, orientation, margins, and 'Fit Sheet on One Page'. Include a 3-question quiz.",
            },
        ],
    },
];

static BUILTIN: Lazy<Catalog> = Lazy::new(|| Catalog { units: UNITS });

impl Catalog {
    /// Returns the built-in catalog.
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Returns the units in teaching order.
    #[must_use]
    pub const fn units(&self) -> &'static [Unit] {
        self.units
    }

    /// Looks up a lesson by id across all units.
    #[must_use]
    pub fn lesson(&self, id: &str) -> Option<&'static Lesson> {
        self.lessons().find(|lesson| lesson.id == id)
    }

    /// Iterates over all lessons in unit order.
    pub fn lessons(&self) -> impl Iterator<Item = &'static Lesson> {
        self.units.iter().flat_map(|unit| unit.lessons.iter())
    }

    /// Returns the catalog listing with seed text stripped, keyed by
    /// lesson id. This is the shape served by `GET /lessons.json`.
    #[must_use]
    pub fn listing(&self) -> BTreeMap<&'static str, LessonSummary> {
        self.lessons()
            .map(|lesson| {
                (
                    lesson.id,
                    LessonSummary {
                        title: lesson.title,
                        summary: lesson.summary,
                    },
                )
            })
            .collect()
    }
}
