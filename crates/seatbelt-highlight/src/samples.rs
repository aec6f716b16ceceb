//! Code samples shown on the documentation home page.
//!
//! Rendered once at startup and handed to the index template as data.

use crate::{Highlighter, Markup};
use std::collections::BTreeMap;

/// A named snippet in a given language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Template data key
    pub name: &'static str,
    /// Language passed to the highlighter
    pub language: &'static str,
    /// Snippet text
    pub source: &'static str,
}

/// Every home page sample.
pub const SAMPLES: &[Sample] = &[
    Sample {
        name: "QuickstartGo",
        language: "go",
        source: r#"package main

import "github.com/go-seatbelt/seatbelt"

func main() {
    app := seatbelt.New()
    app.Get("/", func(c *seatbelt.Context) error {
    	return c.String(200, "Hello, world!")
	})
    app.Start(":3000")
}"#,
    },
    Sample {
        name: "RenderGo",
        language: "go",
        source: r#"package main

import "github.com/go-seatbelt/seatbelt"

func main() {
    app := seatbelt.New()
    app.Get("/", func(c *seatbelt.Context) error {
    	return c.Render("index", map[string]any{
			"Message": "Hello, world!",
		})
	})
    app.Start(":3000")
}"#,
    },
    Sample {
        name: "RenderHTML",
        language: "go html template",
        source: r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Hello, world!</title>
</head>
<body>
  <h1>{{ .Message }}</h1>
</body>
</html>"#,
    },
    Sample {
        name: "SessionGo",
        language: "go",
        source: r#"package main

import "github.com/go-seatbelt/seatbelt"

func main() {
	app := seatbelt.New()
	app.Get("/", func(c *seatbelt.Context) error {
		return c.Render("index", map[string]any{
			"Name": c.Session.Get("name"),
		})
	})
	app.Post("/", func(c *seatbelt.Context) error {
		c.Session.Set("name", c.FormValue("name"))
		return c.Redirect("/")
	})
	app.Start(":3000")
}"#,
    },
    Sample {
        name: "SessionHTML",
        language: "go html template",
        source: r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Sessions</title>
</head>
<body>
  <h1>Current session value: {{ .Name }}</h1>
  <form method="POST" action="/">
    {{ csrf }}
    <label>Set new session value:</label>
    <input type="text" name="name"/>
    <input type="submit" value="Submit"/>
  </form>
</body>
</html>"#,
    },
];

/// Highlight every sample, keyed by its template name.
pub fn render(highlighter: &Highlighter) -> BTreeMap<&'static str, Markup> {
    SAMPLES
        .iter()
        .map(|s| (s.name, highlighter.highlight(s.language, s.source)))
        .collect()
}
