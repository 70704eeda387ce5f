//! Delivery of rendered templates
//!
//! Rendering produces text. Where that text ends up is chosen by the caller
//! through a [`Delivery`]: a byte stream on a server, or a live markup
//! document in an interactive host.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;

/// Destination for rendered content
pub trait Delivery {
    fn deliver(&mut self, rendered: &str) -> Result<(), DeliveryError>;
}

/// Writes rendered content to a byte stream
#[derive(Debug)]
pub struct StreamDelivery<W: Write> {
    writer: W,
}

impl<W: Write> StreamDelivery<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Delivery for StreamDelivery<W> {
    fn deliver(&mut self, rendered: &str) -> Result<(), DeliveryError> {
        self.writer.write_all(rendered.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Where a rendered fragment goes relative to the target element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Append as the last child of the element
    #[default]
    AppendTo,
    /// Replace everything inside the element
    ReplaceInnerContents,
    /// Insert as the previous sibling of the element
    InsertBefore,
}

/// A document element that rendered markup can be placed relative to
pub trait MarkupHost {
    fn append_child(&mut self, markup: &str) -> Result<(), DeliveryError>;

    fn replace_inner(&mut self, markup: &str) -> Result<(), DeliveryError>;

    fn insert_before(&mut self, markup: &str) -> Result<(), DeliveryError>;

    fn set_title(&mut self, title: &str) -> Result<(), DeliveryError>;
}

/// Wraps rendered content in a `<div>` and places it in a document
#[derive(Debug)]
pub struct ElementDelivery<H: MarkupHost> {
    host: H,
    placement: Placement,
    attributes: BTreeMap<String, String>,
    page_title: Option<String>,
}

impl<H: MarkupHost> ElementDelivery<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            placement: Placement::default(),
            attributes: BTreeMap::new(),
            page_title: None,
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the `id` of the wrapping element
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.attributes.insert("id".to_string(), id.into());
        self
    }

    /// Set the `class` of the wrapping element
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.attributes.insert("class".to_string(), class.into());
        self
    }

    /// Set the document title once the content is placed
    pub fn with_page_title(mut self, title: impl Into<String>) -> Self {
        self.page_title = Some(title.into());
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    fn wrap(&self, rendered: &str) -> String {
        let mut open = String::from("<div");
        for (key, value) in &self.attributes {
            open.push_str(&format!(" {}=\"{}\"", key, tera::escape_html(value)));
        }
        format!("{}>{}</div>", open, rendered)
    }
}

impl<H: MarkupHost> Delivery for ElementDelivery<H> {
    fn deliver(&mut self, rendered: &str) -> Result<(), DeliveryError> {
        let markup = self.wrap(rendered);
        match self.placement {
            Placement::AppendTo => self.host.append_child(&markup)?,
            Placement::ReplaceInnerContents => self.host.replace_inner(&markup)?,
            Placement::InsertBefore => self.host.insert_before(&markup)?,
        }

        if let Some(title) = &self.page_title {
            self.host.set_title(title)?;
        }
        Ok(())
    }
}

/// String-backed [`MarkupHost`] for headless rendering and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryHost {
    /// Markup inserted before the element, in insertion order
    pub preceding: Vec<String>,
    /// Inner markup of the element
    pub inner: String,
    /// Current document title
    pub title: Option<String>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose element already contains `inner`
    pub fn with_inner(inner: impl Into<String>) -> Self {
        Self {
            inner: inner.into(),
            ..Self::default()
        }
    }
}

impl MarkupHost for InMemoryHost {
    fn append_child(&mut self, markup: &str) -> Result<(), DeliveryError> {
        self.inner.push_str(markup);
        Ok(())
    }

    fn replace_inner(&mut self, markup: &str) -> Result<(), DeliveryError> {
        self.inner = markup.to_string();
        Ok(())
    }

    fn insert_before(&mut self, markup: &str) -> Result<(), DeliveryError> {
        self.preceding.push(markup.to_string());
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<(), DeliveryError> {
        self.title = Some(title.to_string());
        Ok(())
    }
}

/// How a render call hands its output over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Return the rendered content to the caller
    pub populate_rendered_content: bool,
    /// Render without invoking the delivery
    pub skip_final_step: bool,
}

/// Result of a render call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Rendered content, when requested through [`RenderOptions`]
    pub rendered_content: Option<String>,
    /// Whether the delivery was invoked
    pub delivered: bool,
}

/// Hand `rendered` to `delivery` according to `options`
pub fn deliver(
    rendered: String,
    delivery: &mut dyn Delivery,
    options: RenderOptions,
) -> Result<RenderOutcome, DeliveryError> {
    let delivered = if options.skip_final_step {
        false
    } else {
        delivery.deliver(&rendered)?;
        true
    };

    Ok(RenderOutcome {
        rendered_content: options.populate_rendered_content.then_some(rendered),
        delivered,
    })
}
