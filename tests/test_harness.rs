// tests/test_harness.rs
//! Test harness infrastructure for GDScript parser integration tests
//!
//! This module provides utilities for loading and parsing the scripts under
//! `test_scripts/`, checking the round trip and counting syntax nodes.

#![allow(dead_code)]

use gdscript::visitor::{Visitor, walk_expression, walk_method, walk_statement};
use gdscript::*;
use std::fs;
use std::path::PathBuf;

/// A parsed script together with the text it came from.
pub struct TestResult {
    pub class: ClassDeclaration,
    pub source: String,
}

/// Test harness for loading and parsing GDScript files
pub struct TestHarness {
    test_scripts_dir: PathBuf,
}

impl TestHarness {
    /// Create a new test harness
    pub fn new() -> Self {
        let test_scripts_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_scripts");
        Self { test_scripts_dir }
    }

    pub fn load(&self, filename: &str) -> String {
        let path = self.test_scripts_dir.join(filename);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    /// Load and parse a GDScript file
    pub fn load_and_parse(&self, filename: &str) -> TestResult {
        let source = self.load(filename);
        let class = gdscript::parse(&source)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", filename, e));
        TestResult { class, source }
    }
}

impl TestResult {
    /// Assert that printing the tree gives the source back
    pub fn assert_round_trip(&self) {
        let printed = self.class.to_string();
        if printed != self.source {
            let line = printed
                .lines()
                .zip(self.source.lines())
                .position(|(a, b)| a != b)
                .map(|i| i + 1);
            panic!(
                "Round trip mismatch (first differing line: {:?})\n--- printed ---\n{}\n--- source ---\n{}",
                line, printed, self.source
            );
        }
    }

    /// Assert that nothing was quarantined as an invalid token
    pub fn assert_no_invalid_tokens(&self) {
        let invalid = self.class.invalid_tokens();
        if !invalid.is_empty() {
            let spans: Vec<String> = invalid.iter().map(|t| t.as_str().to_string()).collect();
            panic!("Expected no invalid tokens, found {:?}", spans);
        }
    }

    /// Assert a clean, lossless parse
    pub fn assert_success(&self) {
        self.assert_round_trip();
        self.assert_no_invalid_tokens();
    }

    pub fn count(&self) -> AstCounter {
        AstCounter::new().count_class(&self.class)
    }
}

/// Counts syntax nodes by kind
#[derive(Debug, Default)]
pub struct AstCounter {
    pub method_count: usize,
    pub lambda_count: usize,
    pub statement_count: usize,
    pub if_count: usize,
    pub for_count: usize,
    pub while_count: usize,
    pub match_count: usize,
    pub return_count: usize,
    pub call_count: usize,
    pub binary_expr_count: usize,
    pub ternary_count: usize,
    pub get_node_count: usize,
}

impl AstCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_class(mut self, class: &ClassDeclaration) -> Self {
        self.visit_class(class);
        self
    }
}

impl Visitor for AstCounter {
    fn visit_method(&mut self, method: &MethodDeclaration) {
        self.method_count += 1;
        walk_method(self, method);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        self.statement_count += 1;
        match stmt {
            Statement::If(_) => self.if_count += 1,
            Statement::For(_) => self.for_count += 1,
            Statement::While(_) => self.while_count += 1,
            Statement::Match(_) => self.match_count += 1,
            Statement::Return(_) => self.return_count += 1,
            _ => {}
        }
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Lambda(_) => self.lambda_count += 1,
            Expression::Call(_) => self.call_count += 1,
            Expression::Dual(_) => self.binary_expr_count += 1,
            Expression::Ternary(_) => self.ternary_count += 1,
            Expression::GetNode(_) => self.get_node_count += 1,
            _ => {}
        }
        walk_expression(self, expr);
    }
}
