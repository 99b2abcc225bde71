//! Curriculum catalog
//!
//! Read-only lookup over the course structure. The built-in catalog carries
//! the default Python and pandas course skeleton; a custom course can be
//! loaded from a JSON file with the same shape.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::model::{Difficulty, Lesson, LessonKind, Module};

/// An ordered course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Modules in unlock order
    pub modules: Vec<Module>,
}

/// (id, title, kind, difficulty, xp)
type LessonRow = (&'static str, &'static str, LessonKind, Difficulty, u32);

impl Catalog {
    /// Create a catalog from modules in unlock order
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    /// Load a catalog from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog {:?}", path))
    }

    /// All modules in unlock order
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Find a module by ID
    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    /// Find a lesson by ID anywhere in the course
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.modules.iter().find_map(|m| m.lesson(lesson_id))
    }

    /// The module that owns a lesson
    pub fn module_of_lesson(&self, lesson_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.contains(lesson_id))
    }

    /// The prerequisite of a module: the one right before it
    pub fn previous_module(&self, module_id: &str) -> Option<&Module> {
        let index = self.modules.iter().position(|m| m.id == module_id)?;
        index.checked_sub(1).and_then(|i| self.modules.get(i))
    }

    /// Lessons of a module (empty if the module is unknown)
    pub fn lessons_in_module(&self, module_id: &str) -> &[Lesson] {
        self.module(module_id).map(|m| m.lessons.as_slice()).unwrap_or(&[])
    }

    /// Total lesson count across all modules
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// The default course
    pub fn builtin() -> Self {
        use Difficulty::{Advanced as A, Beginner as B, Intermediate as I};
        use LessonKind::{Concept as C, Exercise as E, Theory as T};

        let module = |id: &str, title: &str, category: &str, min: u32, rows: &[LessonRow]| {
            rows.iter().fold(Module::new(id, title, category, min), |m, &(lid, name, kind, d, xp)| {
                m.with_lesson(Lesson::new(lid, name, kind, d, xp))
            })
        };

        Self::new(vec![
            module("py-fundamentals", "Python Fundamentals", "python-basics", 25, &[
                ("py-fund-theory", "Introduction to Programming", T, B, 25),
                ("py-fund-1", "What is programming?", C, B, 50),
                ("py-fund-2", "Variables: naming things", C, B, 75),
                ("py-fund-3", "Data types", C, B, 100),
                ("py-fund-4", "Challenge: first steps", E, B, 150),
            ]),
            module("py-logic", "Logic and Decisions", "python-basics", 30, &[
                ("py-logic-theory", "Conditional Thinking", T, B, 25),
                ("py-logic-1", "Conditionals: if, elif, else", C, B, 100),
                ("py-logic-2", "Logical operators", C, B, 100),
                ("py-logic-3", "Comparisons and truthiness", C, I, 125),
                ("py-logic-4", "Challenge: decision making", E, I, 175),
            ]),
            module("py-loops", "Loops and Repetition", "python-basics", 35, &[
                ("py-loops-theory", "The Power of Repetition", T, B, 25),
                ("py-loops-1", "For loops", C, B, 100),
                ("py-loops-2", "While loops", C, I, 125),
                ("py-loops-3", "List comprehensions", C, I, 150),
                ("py-loops-4", "Break, continue and else", C, I, 125),
                ("py-loops-5", "Challenge: automation", E, I, 200),
            ]),
            module("py-structures", "Data Structures", "python-intermediate", 40, &[
                ("py-struct-theory", "Organizing Information", T, B, 25),
                ("py-struct-1", "Lists", C, B, 100),
                ("py-struct-2", "List methods", C, B, 100),
                ("py-struct-3", "Dictionaries", C, I, 125),
                ("py-struct-4", "Sets and tuples", C, I, 125),
                ("py-struct-5", "Challenge: data wrangling", E, I, 200),
            ]),
            module("py-functions", "Functions", "python-intermediate", 35, &[
                ("py-func-theory", "Modularization", T, B, 25),
                ("py-func-1", "Defining functions", C, B, 100),
                ("py-func-2", "Parameters and return values", C, I, 125),
                ("py-func-3", "Variable scope", C, I, 150),
                ("py-func-4", "Lambdas", C, A, 175),
                ("py-func-5", "Challenge: refactoring", E, A, 225),
            ]),
            module("pandas-intro", "Introduction to pandas", "pandas-basics", 30, &[
                ("pd-intro-theory", "The World of Data", T, B, 25),
                ("pd-intro-1", "Why pandas exists", C, B, 100),
                ("pd-intro-2", "Series", C, B, 100),
                ("pd-intro-3", "DataFrame", C, B, 125),
                ("pd-intro-4", "Challenge: first DataFrames", E, B, 175),
            ]),
            module("pandas-manipulation", "Data Manipulation", "pandas-basics", 40, &[
                ("pd-manip-theory", "The Art of Selection", T, B, 25),
                ("pd-manip-1", "Selecting with loc and iloc", C, B, 125),
                ("pd-manip-2", "Boolean filters", C, I, 150),
                ("pd-manip-3", "Creating and changing columns", C, I, 150),
                ("pd-manip-4", "Sorting and ranking", C, I, 125),
                ("pd-manip-5", "Challenge: transformation", E, I, 200),
            ]),
            module("pandas-analysis", "Data Analysis", "pandas-intermediate", 45, &[
                ("pd-analysis-theory", "Extracting Insights", T, I, 25),
                ("pd-analysis-1", "GroupBy", C, I, 175),
                ("pd-analysis-2", "Descriptive statistics", C, I, 150),
                ("pd-analysis-3", "Pivot tables", C, A, 200),
                ("pd-analysis-4", "Aggregation functions", C, A, 175),
                ("pd-analysis-5", "Challenge: analytical report", E, A, 250),
            ]),
            module("pandas-advanced", "Advanced pandas", "pandas-intermediate", 50, &[
                ("pd-adv-theory", "Real World Data", T, I, 25),
                ("pd-adv-1", "Merge and join", C, I, 175),
                ("pd-adv-2", "Join types", C, I, 175),
                ("pd-adv-3", "Missing data", C, I, 150),
                ("pd-adv-4", "Apply and vectorization", C, A, 200),
                ("pd-adv-5", "Case studies", LessonKind::Challenge, A, 300),
            ]),
            module("tech-english-reading", "Technical English: Reading", "technical-english", 40, &[
                ("eng-read-theory", "Technical Reading Strategies", T, B, 25),
                ("eng-read-1", "Essential Python vocabulary", C, B, 100),
                ("eng-read-2", "How documentation is structured", C, B, 100),
                ("eng-read-3", "Reading Q&A threads", C, I, 125),
                ("eng-read-4", "Error messages", C, I, 125),
                ("eng-read-5", "Challenge: real documentation", E, I, 175),
            ]),
            module("tech-english-patterns", "Technical English: Patterns", "technical-english", 35, &[
                ("eng-pattern-theory", "Recurring Patterns", T, I, 25),
                ("eng-pattern-1", "Technical action verbs", C, I, 125),
                ("eng-pattern-2", "Conditions and requirements", C, I, 125),
                ("eng-pattern-3", "Technical comparisons", C, I, 125),
                ("eng-pattern-4", "Instructions and procedures", C, I, 125),
                ("eng-pattern-5", "Challenge: exam questions", E, A, 200),
            ]),
        ])
    }
}
