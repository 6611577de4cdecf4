//! Live preview pipeline
//!
//! Raw source -> [`transform`] -> [`Evaluator`] -> component tree mounted in
//! the preview pane, with the repo CSS written into the document head by a
//! [`StyleInjector`].
//!
//! The evaluator and the document head are traits so the pipeline runs the
//! same way against the browser runtime and against test doubles. Every
//! failure ends up in [`PreviewOutcome::Failed`]; nothing escapes
//! [`PreviewPipeline::render`].

use std::collections::BTreeMap;

use super::repo::{Language, PreviewSource};
use super::transform::{TransformMode, TransformedSource, transform};

/// Evaluation failure reported by the runtime
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("ReferenceError: {0}")]
    Reference(String),

    #[error("{0}")]
    Runtime(String),

    #[error("Nothing to render: the source is empty")]
    Empty,

    #[error("Preview runtime unavailable: {0}")]
    Unavailable(String),
}

impl EvalError {
    /// Classify a runtime error by its JS error name
    pub fn from_js(name: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match name {
            "SyntaxError" => EvalError::Syntax(message),
            "ReferenceError" => EvalError::Reference(message),
            _ => EvalError::Runtime(message),
        }
    }
}

/// Whitelisted bindings visible to the evaluated source
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvalScope {
    bindings: BTreeMap<String, String>,
}

impl EvalScope {
    /// Scope for a preview source: raw CSS as `css`, repo name as `repoName`
    pub fn for_source(source: &PreviewSource) -> Self {
        let mut scope = Self::default();
        scope.bind("css", source.source_css.clone());
        if let Some(name) = &source.name {
            scope.bind("repoName", name.clone());
        }
        scope
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.bindings.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Compiles transformed source and mounts the component into the pane it
/// owns, replacing the tree mounted by the previous pass
pub trait Evaluator {
    fn evaluate(
        &mut self,
        source: &TransformedSource,
        language: Language,
        scope: &EvalScope,
    ) -> Result<(), EvalError>;

    /// Remove the mounted tree; the next pass mounts a fresh one
    fn unmount(&mut self);
}

/// Style element failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleError {
    #[error("document head is not available")]
    NoHead,

    #[error("failed to create style element: {0}")]
    Create(String),
}

/// The document head, as far as preview styles are concerned
pub trait StyleHost {
    type Handle;

    fn append(&mut self, css: &str) -> Result<Self::Handle, StyleError>;
    fn update(&mut self, handle: &Self::Handle, css: &str);
    fn remove(&mut self, handle: Self::Handle);
}

/// How repeated render passes treat style elements
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StylePolicy {
    /// Append a new element on every pass and never remove them
    Accumulate,
    /// Keep one element per preview, rewrite it each pass, remove on drop
    #[default]
    Scoped,
}

/// Writes preview CSS into a [`StyleHost`] according to a [`StylePolicy`]
pub struct StyleInjector<H: StyleHost> {
    host: H,
    policy: StylePolicy,
    active: Option<H::Handle>,
}

impl<H: StyleHost> StyleInjector<H> {
    pub fn new(host: H, policy: StylePolicy) -> Self {
        Self {
            host,
            policy,
            active: None,
        }
    }

    pub fn policy(&self) -> StylePolicy {
        self.policy
    }

    pub fn apply(&mut self, css: &str) -> Result<(), StyleError> {
        match self.policy {
            StylePolicy::Accumulate => {
                self.host.append(css)?;
            }
            StylePolicy::Scoped => match &self.active {
                Some(handle) => self.host.update(handle, css),
                None => self.active = Some(self.host.append(css)?),
            },
        }
        Ok(())
    }

    /// Remove the tracked element, if any
    pub fn release(&mut self) {
        if let Some(handle) = self.active.take() {
            self.host.remove(handle);
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: StyleHost> Drop for StyleInjector<H> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Result of one render pass
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    /// The component tree is live in the pane
    Rendered,
    Failed { error: EvalError },
}

impl PreviewOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, PreviewOutcome::Rendered)
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            PreviewOutcome::Rendered => None,
            PreviewOutcome::Failed { error } => Some(error.to_string()),
        }
    }
}

/// Transform + evaluate + style injection for one preview pane
pub struct PreviewPipeline<E: Evaluator, H: StyleHost> {
    evaluator: E,
    styles: StyleInjector<H>,
    mode: TransformMode,
}

impl<E: Evaluator, H: StyleHost> PreviewPipeline<E, H> {
    pub fn new(evaluator: E, host: H, policy: StylePolicy) -> Self {
        Self {
            evaluator,
            styles: StyleInjector::new(host, policy),
            mode: TransformMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: TransformMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Run one render pass; re-evaluates every time it is called
    pub fn render(&mut self, source: &PreviewSource) -> PreviewOutcome {
        let transformed = transform(&source.source_js, self.mode);

        if let Err(e) = self.styles.apply(&source.source_css) {
            leptos::logging::warn!("Preview styles not applied: {}", e);
        }

        if transformed.is_empty() {
            return PreviewOutcome::Failed {
                error: EvalError::Empty,
            };
        }

        let scope = EvalScope::for_source(source);
        match self
            .evaluator
            .evaluate(&transformed, source.language(), &scope)
        {
            Ok(()) => PreviewOutcome::Rendered,
            Err(error) => PreviewOutcome::Failed { error },
        }
    }

    /// Unmount the tree and release the style element (styles are also
    /// released on drop)
    pub fn teardown(&mut self) {
        self.evaluator.unmount();
        self.styles.release();
    }

    pub fn styles(&self) -> &StyleInjector<H> {
        &self.styles
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory doubles for the browser seams

    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Head element list; clones share state
    #[derive(Clone, Default, Debug)]
    pub struct MemoryHead {
        styles: Rc<RefCell<Vec<(usize, String)>>>,
        next_id: Rc<RefCell<usize>>,
    }

    impl MemoryHead {
        pub fn style_contents(&self) -> Vec<String> {
            self.styles.borrow().iter().map(|(_, css)| css.clone()).collect()
        }

        pub fn style_count(&self) -> usize {
            self.styles.borrow().len()
        }
    }

    impl StyleHost for MemoryHead {
        type Handle = usize;

        fn append(&mut self, css: &str) -> Result<usize, StyleError> {
            let mut next = self.next_id.borrow_mut();
            *next += 1;
            self.styles.borrow_mut().push((*next, css.to_string()));
            Ok(*next)
        }

        fn update(&mut self, handle: &usize, css: &str) {
            if let Some(entry) = self.styles.borrow_mut().iter_mut().find(|(id, _)| id == handle) {
                entry.1 = css.to_string();
            }
        }

        fn remove(&mut self, handle: usize) {
            self.styles.borrow_mut().retain(|(id, _)| *id != handle);
        }
    }

    /// Mounts `export default function X(){return <jsx>}` by echoing the
    /// returned JSX into `mounted`; reports a ReferenceError for
    /// `undefinedThing` and a SyntaxError for unbalanced braces
    #[derive(Clone, Default)]
    pub struct EchoEvaluator {
        pub calls: Rc<RefCell<Vec<(String, Language)>>>,
        pub mounted: Rc<RefCell<Option<String>>>,
    }

    impl EchoEvaluator {
        pub fn mounted(&self) -> Option<String> {
            self.mounted.borrow().clone()
        }

        pub fn last_code(&self) -> Option<String> {
            self.calls.borrow().last().map(|(code, _)| code.clone())
        }
    }

    impl Evaluator for EchoEvaluator {
        fn evaluate(
            &mut self,
            source: &TransformedSource,
            language: Language,
            _scope: &EvalScope,
        ) -> Result<(), EvalError> {
            let code = source.as_str();
            self.calls.borrow_mut().push((code.to_string(), language));

            if code.matches('{').count() != code.matches('}').count() {
                return Err(EvalError::Syntax("Unexpected token".to_string()));
            }
            if code.contains("undefinedThing") {
                return Err(EvalError::Reference("undefinedThing is not defined".to_string()));
            }
            let start = code
                .find("return")
                .map(|i| i + "return".len())
                .ok_or_else(|| EvalError::Runtime("No component returned".to_string()))?;
            let rest = code[start..].trim_start();
            let end = rest.rfind('>').map(|i| i + 1).unwrap_or(rest.len());
            *self.mounted.borrow_mut() = Some(rest[..end].trim().to_string());
            Ok(())
        }

        fn unmount(&mut self) {
            self.mounted.borrow_mut().take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{EchoEvaluator, MemoryHead};
    use super::*;

    fn source(js: &str, css: &str) -> PreviewSource {
        PreviewSource {
            source_js: js.to_string(),
            source_css: css.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_renders_transformed_source() {
        let evaluator = EchoEvaluator::default();
        let head = MemoryHead::default();
        let mut pipeline = PreviewPipeline::new(evaluator.clone(), head, StylePolicy::Scoped);

        let outcome = pipeline.render(&source(
            "import React from 'react';\nexport default function App(){return <p>ok</p>}",
            "",
        ));

        assert_eq!(outcome, PreviewOutcome::Rendered);
        assert_eq!(evaluator.mounted().as_deref(), Some("<p>ok</p>"));
        assert!(!evaluator.last_code().unwrap().contains("import"));
    }

    #[test]
    fn test_empty_source_is_an_error_not_a_panic() {
        let evaluator = EchoEvaluator::default();
        let mut pipeline =
            PreviewPipeline::new(evaluator.clone(), MemoryHead::default(), StylePolicy::Scoped);

        let outcome = pipeline.render(&source("", ""));

        assert_eq!(
            outcome,
            PreviewOutcome::Failed {
                error: EvalError::Empty
            }
        );
        assert!(outcome.error_message().is_some());
        assert!(evaluator.calls.borrow().is_empty());
    }

    #[test]
    fn test_evaluation_errors_are_captured() {
        let mut pipeline = PreviewPipeline::new(
            EchoEvaluator::default(),
            MemoryHead::default(),
            StylePolicy::Scoped,
        );

        let syntax = pipeline.render(&source("function App() { return <div>", ""));
        assert!(matches!(
            syntax,
            PreviewOutcome::Failed {
                error: EvalError::Syntax(_)
            }
        ));

        let reference = pipeline.render(&source("const a = undefinedThing;", ""));
        assert_eq!(
            reference.error_message().unwrap(),
            "ReferenceError: undefinedThing is not defined"
        );
    }

    #[test]
    fn test_every_change_re_evaluates() {
        let evaluator = EchoEvaluator::default();
        let mut pipeline =
            PreviewPipeline::new(evaluator.clone(), MemoryHead::default(), StylePolicy::Scoped);
        let src = source("function A(){return <a/>}", "");
        pipeline.render(&src);
        pipeline.render(&src);
        assert_eq!(evaluator.calls.borrow().len(), 2);
    }

    #[test]
    fn test_accumulate_policy_appends_every_pass() {
        let head = MemoryHead::default();
        let mut pipeline =
            PreviewPipeline::new(EchoEvaluator::default(), head.clone(), StylePolicy::Accumulate);
        let src = source("function A(){return <a/>}", ".a{color:red}");

        pipeline.render(&src);
        pipeline.render(&src);

        assert_eq!(head.style_count(), 2);
        assert_eq!(head.style_contents(), vec![".a{color:red}", ".a{color:red}"]);

        drop(pipeline);
        // Nothing tracked, nothing released
        assert_eq!(head.style_count(), 2);
    }

    #[test]
    fn test_scoped_policy_keeps_one_element_and_releases_on_drop() {
        let head = MemoryHead::default();
        let mut pipeline =
            PreviewPipeline::new(EchoEvaluator::default(), head.clone(), StylePolicy::Scoped);

        pipeline.render(&source("function A(){return <a/>}", ".a{color:red}"));
        pipeline.render(&source("function A(){return <a/>}", ".a{color:blue}"));

        assert_eq!(head.style_contents(), vec![".a{color:blue}"]);

        drop(pipeline);
        assert_eq!(head.style_count(), 0);
    }

    #[test]
    fn test_each_pass_replaces_the_mounted_tree() {
        let evaluator = EchoEvaluator::default();
        let mut pipeline =
            PreviewPipeline::new(evaluator.clone(), MemoryHead::default(), StylePolicy::Scoped);

        pipeline.render(&source("function A(){return <a>1</a>}", ""));
        pipeline.render(&source("function A(){return <a>2</a>}", ""));
        assert_eq!(evaluator.mounted().as_deref(), Some("<a>2</a>"));

        pipeline.teardown();
        assert_eq!(evaluator.mounted(), None);
    }

    #[test]
    fn test_source_language_reaches_evaluator() {
        let evaluator = EchoEvaluator::default();
        let mut pipeline =
            PreviewPipeline::new(evaluator.clone(), MemoryHead::default(), StylePolicy::Scoped);

        pipeline.render(&source("function A(){return <a/>}", ""));
        pipeline.render(&PreviewSource {
            language: Some(Language::Jsx),
            ..source("function A(){return <a/>}", "")
        });

        let languages: Vec<Language> = evaluator.calls.borrow().iter().map(|(_, l)| *l).collect();
        assert_eq!(languages, vec![Language::Tsx, Language::Jsx]);
    }

    #[test]
    fn test_teardown_releases_early() {
        let head = MemoryHead::default();
        let mut pipeline =
            PreviewPipeline::new(EchoEvaluator::default(), head.clone(), StylePolicy::Scoped);
        pipeline.render(&source("function A(){return <a/>}", ".a{}"));
        pipeline.teardown();
        assert_eq!(head.style_count(), 0);
        // Next pass acquires a fresh element
        pipeline.render(&source("function A(){return <a/>}", ".b{}"));
        assert_eq!(head.style_contents(), vec![".b{}"]);
    }

    #[test]
    fn test_styles_applied_even_when_evaluation_fails() {
        let head = MemoryHead::default();
        let mut pipeline =
            PreviewPipeline::new(EchoEvaluator::default(), head.clone(), StylePolicy::Scoped);
        let outcome = pipeline.render(&source("", ".x{}"));
        assert!(!outcome.is_rendered());
        assert_eq!(head.style_contents(), vec![".x{}"]);
    }

    #[test]
    fn test_lexical_mode_handles_multi_line_imports() {
        let evaluator = EchoEvaluator::default();
        let mut pipeline =
            PreviewPipeline::new(evaluator.clone(), MemoryHead::default(), StylePolicy::Scoped)
                .with_mode(TransformMode::Lexical);
        let outcome = pipeline.render(&source(
            "import {\n  a,\n  b\n} from 'x';\nfunction A(){return <i/>}",
            "",
        ));
        assert!(outcome.is_rendered());
        assert_eq!(evaluator.last_code().as_deref(), Some("function A(){return <i/>}"));
    }

    #[test]
    fn test_scope_exposes_css_and_name() {
        let scope = EvalScope::for_source(&PreviewSource {
            source_js: String::new(),
            source_css: ".a{}".to_string(),
            name: Some("Card".to_string()),
            ..Default::default()
        });
        assert_eq!(scope.get("css"), Some(".a{}"));
        assert_eq!(scope.get("repoName"), Some("Card"));
        assert_eq!(scope.iter().count(), 2);
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(
            EvalError::from_js("SyntaxError", "x"),
            EvalError::Syntax("x".to_string())
        );
        assert_eq!(
            EvalError::from_js("TypeError", "y"),
            EvalError::Runtime("y".to_string())
        );
    }
}
