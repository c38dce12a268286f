// HTML rendering for catalog pages

use anyhow::{Context, Result};
use minijinja::{context, Environment};

use crate::api::models::ItemRow;
use crate::catalog::{Category, PageData};

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{% if title %}{{ title }} | {% endif %}Warehouse catalog</title>
  <link rel="icon" href="/favicon.ico">
  <link rel="stylesheet" href="/styles.css">
</head>
<body>
  <nav>
    <a href="/">Home</a>
    {% for c in categories %}<a href="/{{ c.slug }}"{% if c.slug == current %} class="active"{% endif %}>{{ c.title }}</a>
    {% endfor %}
  </nav>
  <main>
  {% if rows is none %}
    <h1>Warehouse catalog</h1>
    <p>Pick a product category above.</p>
  {% else %}
    <h1>{{ title }}</h1>
    <p class="updated">Availability last updated: {% if last_updated %}{{ last_updated }}{% else %}not yet available{% endif %}</p>
    {% if rows %}
    <table>
      <thead>
        <tr><th>Name</th><th>Colors</th><th>Price</th><th>Manufacturer</th><th>Availability</th></tr>
      </thead>
      <tbody>
      {% for row in rows %}
        <tr data-id="{{ row.id }}">
          <td>{{ row.name }}</td>
          <td>{{ row.colors }}</td>
          <td>{{ row.price }}</td>
          <td>{{ row.manufacturer }}</td>
          <td class="stock">{{ row.availability }}</td>
        </tr>
      {% endfor %}
      </tbody>
    </table>
    {% else %}
    <p>Products are still loading. Refresh the page in a moment.</p>
    {% endif %}
  {% endif %}
  </main>
</body>
</html>
"#;

#[derive(serde::Serialize)]
struct NavEntry {
    slug: &'static str,
    title: &'static str,
}

/// Template environment built once at startup and shared by all workers.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        // `.html` name turns on HTML auto-escaping.
        env.add_template("page.html", PAGE_TEMPLATE)
            .context("Failed to add page template")?;
        Ok(Self { env })
    }

    pub fn render(&self, category: Option<Category>, page: &PageData) -> Result<String> {
        let template = self.env.get_template("page.html")?;
        let categories: Vec<NavEntry> = Category::ALL
            .into_iter()
            .map(|c| NavEntry {
                slug: c.slug(),
                title: c.title(),
            })
            .collect();

        let rows = page.items.as_ref().map(|items| {
            items
                .iter()
                .map(|item| ItemRow {
                    id: item.id.clone(),
                    name: item.name().unwrap_or(&item.id).to_string(),
                    colors: item.colors().join(", "),
                    price: item.price().unwrap_or_default(),
                    manufacturer: item.manufacturer.clone(),
                    availability: page.stock_status(&item.id).unwrap_or("unknown").to_string(),
                })
                .collect::<Vec<_>>()
        });
        let last_updated = page
            .last_updated
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string());

        template
            .render(context! {
                title => category.map(Category::title),
                current => category.map(Category::slug),
                categories,
                rows,
                last_updated,
            })
            .context("Failed to render page template")
    }
}
