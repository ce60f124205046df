//! In-memory registry content for tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use kit_registry::{ContentSource, Error, Result};

/// Serves registry files from a map and records every requested path.
#[derive(Default)]
pub struct MapSource {
    files: HashMap<String, String>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    pub fn with_index(self, paths: &[&str]) -> Self {
        let mut index = String::from("packages:\n");
        for path in paths {
            index.push_str(&format!("  - {path}\n"));
        }
        self.with_file("index.yaml", &index)
    }

    pub fn with_manifest(self, path: &str, name: &str, version: &str) -> Self {
        let content = format!("name: {name}\nversion: \"{version}\"\ndescription: {name} tool\n");
        self.with_file(path, &content)
    }

    /// Shared handle to the request log, usable after the source is boxed.
    pub fn request_log(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.requests)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl ContentSource for MapSource {
    fn fetch(&self, path: &str) -> Result<String> {
        self.requests.borrow_mut().push(path.to_string());
        self.files.get(path).cloned().ok_or_else(|| Error::Status {
            url: format!("memory://{path}"),
            status: 404,
            body: "Not Found".to_string(),
        })
    }
}
