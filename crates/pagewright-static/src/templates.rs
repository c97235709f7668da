//! Template engine and typed render contexts.

use std::path::Path;

use minijinja::{path_loader, Environment, Value};
use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;

use crate::catalog::{listing_url, CategoryLink, ContentRecord};

/// Template used for listing pages.
pub const LIST_TEMPLATE: &str = "index.html";

/// Template used for detail pages.
pub const DETAIL_TEMPLATE: &str = "detail.html";

/// Context for one listing page.
#[derive(Debug, Clone, Serialize)]
pub struct ListingContext<'a> {
    pub site_title: &'a str,
    pub categories: &'a [CategoryLink],
    /// Records on this page
    pub content: &'a [&'a ContentRecord],
    pub is_list: bool,
    /// `None` on the site index
    pub current_category: Option<&'a str>,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: Option<usize>,
    /// File names of every page in this scope, in page order
    pub page_urls: &'a [String],
}

/// Context for one detail page.
#[derive(Debug, Clone, Serialize)]
pub struct DetailContext<'a> {
    pub site_title: &'a str,
    pub categories: &'a [CategoryLink],
    pub current_category: &'a str,
    pub row: &'a ContentRecord,
    pub is_list: bool,
}

impl<'a> DetailContext<'a> {
    pub fn new(
        site_title: &'a str,
        categories: &'a [CategoryLink],
        row: &'a ContentRecord,
    ) -> Self {
        Self {
            site_title,
            categories,
            current_category: &row.category,
            row,
            is_list: false,
        }
    }
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a template engine with the built-in templates.
    pub fn new() -> Self {
        let mut env = Self::environment();

        env.add_template("base.html", BASE_TEMPLATE)
            .expect("built-in base template is valid");
        env.add_template(LIST_TEMPLATE, LIST_TEMPLATE_SOURCE)
            .expect("built-in list template is valid");
        env.add_template(DETAIL_TEMPLATE, DETAIL_TEMPLATE_SOURCE)
            .expect("built-in detail template is valid");

        Self { env }
    }

    /// Load templates from a directory.
    ///
    /// Both [`LIST_TEMPLATE`] and [`DETAIL_TEMPLATE`] must exist and compile.
    pub fn from_dir(dir: &Path) -> Result<Self, minijinja::Error> {
        let mut env = Self::environment();
        env.set_loader(path_loader(dir));

        let engine = Self { env };
        engine.env.get_template(LIST_TEMPLATE)?;
        engine.env.get_template(DETAIL_TEMPLATE)?;

        Ok(engine)
    }

    fn environment() -> Environment<'static> {
        let mut env = Environment::new();
        env.add_filter("parse_markdown", parse_markdown);
        env.add_filter("urlify_category", urlify_category);
        env
    }

    /// Render a named template with any serializable context.
    pub fn render<S: Serialize>(
        &self,
        template: &str,
        context: &S,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template(template)?.render(context)
    }

    pub fn render_listing(&self, context: &ListingContext<'_>) -> Result<String, minijinja::Error> {
        self.render(LIST_TEMPLATE, context)
    }

    pub fn render_detail(&self, context: &DetailContext<'_>) -> Result<String, minijinja::Error> {
        self.render(DETAIL_TEMPLATE, context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert Markdown to HTML. Single newlines become line breaks.
pub fn markdown_to_html(source: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

fn parse_markdown(value: &str) -> Value {
    Value::from_safe_string(markdown_to_html(value))
}

fn urlify_category(value: &str) -> String {
    listing_url(value, 1)
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}{{ site_title }}{% endblock %}</title>
  <link rel="stylesheet" href="static/style.css">
</head>
<body>
  <header>
    <a href="index1.html" class="site-title">{{ site_title }}</a>
    <nav>
      <ul class="categories">
      {% for category in categories %}
        <li{% if category.name == current_category %} class="active"{% endif %}>
          <a href="{{ category.url }}">{{ category.name }}</a>
        </li>
      {% endfor %}
      </ul>
    </nav>
  </header>
  <main>
    {% block content %}{% endblock %}
  </main>
</body>
</html>"##;

const LIST_TEMPLATE_SOURCE: &str = r##"{% extends "base.html" %}

{% block content %}
<section class="list">
{% for row in content %}
  <article>
    <h2><a href="{{ row.detail_url }}">{{ row.title }}</a></h2>
    <p class="meta">{{ row.date }} &middot; <a href="{{ row.category | urlify_category }}">{{ row.category }}</a></p>
  </article>
{% endfor %}
</section>
{% if total_pages > 1 %}
<nav class="pagination">
{% for url in page_urls %}
  <a href="{{ url }}"{% if loop.index == current_page %} class="current"{% endif %}>{{ loop.index }}</a>
{% endfor %}
</nav>
{% endif %}
{% endblock %}"##;

const DETAIL_TEMPLATE_SOURCE: &str = r##"{% extends "base.html" %}

{% block title %}{{ row.title }} - {{ site_title }}{% endblock %}

{% block content %}
<article class="detail">
  <h1>{{ row.title }}</h1>
  <p class="meta">{{ row.date }} &middot; <a href="{{ row.category | urlify_category }}">{{ row.category }}</a></p>
  <div class="content">
    {{ row.content | parse_markdown }}
  </div>
</article>
{% endblock %}"##;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn record() -> ContentRecord {
        ContentRecord {
            title: "Hello World".to_string(),
            date: "2020-01-02".to_string(),
            category: "Blog".to_string(),
            content: "Some **bold** words\nnext line\n".to_string(),
            detail_url: "hello-world.html".to_string(),
        }
    }

    fn categories() -> Vec<CategoryLink> {
        vec![CategoryLink {
            name: "Blog".to_string(),
            url: "Blog1.html".to_string(),
        }]
    }

    #[test]
    fn parse_markdown_renders_html() {
        let html = markdown_to_html("**Boo!**");

        assert!(html.contains("<p><strong>Boo!</strong></p>"));
    }

    #[test]
    fn parse_markdown_breaks_on_newline() {
        let html = markdown_to_html("first\nsecond");

        assert!(html.contains("first<br />"));
    }

    #[test]
    fn urlify_category_points_at_first_page() {
        assert_eq!(urlify_category("Blog"), "Blog1.html");
    }

    #[test]
    fn renders_listing_page() {
        let engine = TemplateEngine::new();
        let row = record();
        let rows = vec![&row];
        let categories = categories();
        let page_urls = vec!["index1.html".to_string(), "index2.html".to_string()];

        let html = engine
            .render_listing(&ListingContext {
                site_title: "My site",
                categories: &categories,
                content: &rows,
                is_list: true,
                current_category: None,
                current_page: 1,
                total_pages: 2,
                page_size: Some(1),
                page_urls: &page_urls,
            })
            .unwrap();

        assert!(html.contains("<title>My site</title>"));
        assert!(html.contains(r#"<a href="hello-world.html">Hello World</a>"#));
        assert!(html.contains(r#"<a href="Blog1.html">Blog</a>"#));
        assert!(html.contains(r#"<a href="index2.html">2</a>"#));
    }

    #[test]
    fn renders_detail_page() {
        let engine = TemplateEngine::new();
        let row = record();
        let categories = categories();

        let html = engine
            .render_detail(&DetailContext::new("My site", &categories, &row))
            .unwrap();

        assert!(html.contains("<title>Hello World - My site</title>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains(r#"<li class="active">"#));
    }

    #[test]
    fn escapes_record_fields() {
        let engine = TemplateEngine::new();
        let mut row = record();
        row.title = "<script>alert(1)</script>".to_string();
        let categories = categories();

        let html = engine
            .render_detail(&DetailContext::new("My site", &categories, &row))
            .unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn loads_templates_from_directory() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("index.html"),
            "list {{ current_page }}/{{ total_pages }}",
        )
        .unwrap();
        fs::write(temp.path().join("detail.html"), "detail {{ row.title }}").unwrap();

        let engine = TemplateEngine::from_dir(temp.path()).unwrap();
        let row = record();
        let categories = categories();

        let html = engine
            .render_detail(&DetailContext::new("My site", &categories, &row))
            .unwrap();

        assert_eq!(html, "detail Hello World");
    }

    #[test]
    fn missing_template_is_an_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("index.html"), "list").unwrap();

        let result = TemplateEngine::from_dir(temp.path());

        assert!(result.is_err());
    }
}
