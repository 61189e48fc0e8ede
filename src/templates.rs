//! Markdown bodies for pull requests and issues.

use minijinja::{Environment, context};

const PULL_REQUEST: &str = "## Description
Context: {{ context }}

Solution: {{ solution }}

Dependencies: {{ dependencies }}

## Please Verify that you have completed the following steps
- [{{ reviewed }}] I have self-reviewed my code.
- [{{ tested }}] I have included test cases validating introduced feature/fix.
- [{{ documented }}] I have updated the documentation.
";

const SECTIONS: &str = "{% for heading, text in sections %}## {{ heading }}\n\n{{ text }}\n\n{% endfor %}";

/// Documentation issue categories offered when filing a `docs` issue.
pub const DOC_ISSUE_KINDS: &[&str] = &["Missing", "Outdated", "Typo", "Inaccurate"];

fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template("pull_request", PULL_REQUEST)?;
    env.add_template("sections", SECTIONS)?;
    Ok(env)
}

fn mark(checked: bool) -> &'static str {
    if checked { "x" } else { " " }
}

/// Answers that make up a pull request description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestBody {
    pub context: String,
    pub solution: String,
    pub dependencies: String,
    pub self_reviewed: bool,
    pub tested: bool,
    pub documented: bool,
}

impl PullRequestBody {
    pub fn render(&self) -> Result<String, minijinja::Error> {
        environment()?.get_template("pull_request")?.render(context! {
            context => self.context,
            solution => self.solution,
            dependencies => self.dependencies,
            reviewed => mark(self.self_reviewed),
            tested => mark(self.tested),
            documented => mark(self.documented),
        })
    }
}

/// Issue description, shaped by the issue's label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueBody {
    Bug {
        description: String,
        steps: String,
        expected: String,
        actual: String,
        additional: String,
    },
    Docs {
        description: String,
        location: String,
        kind: String,
        details: String,
        suggestion: String,
        additional: String,
    },
    Feat {
        description: String,
        solution: String,
        alternatives: String,
        additional: String,
    },
    Freeform(String),
}

impl IssueBody {
    fn sections(&self) -> Vec<(&'static str, &str)> {
        match self {
            IssueBody::Bug {
                description,
                steps,
                expected,
                actual,
                additional,
            } => vec![
                ("Description", description),
                ("Steps to Reproduce the Problem", steps),
                ("Expected Behavior", expected),
                ("Actual Behavior", actual),
                ("Additional Information", additional),
            ],
            IssueBody::Docs {
                description,
                location,
                kind,
                details,
                suggestion,
                additional,
            } => vec![
                ("Description", description),
                ("Location", location),
                ("Issue Type", kind),
                ("Details", details),
                ("Suggestion", suggestion),
                ("Additional Information", additional),
            ],
            IssueBody::Feat {
                description,
                solution,
                alternatives,
                additional,
            } => vec![
                ("Description", description),
                ("Solution", solution),
                ("Alternatives", alternatives),
                ("Additional Information", additional),
            ],
            IssueBody::Freeform(_) => Vec::new(),
        }
    }

    pub fn render(&self) -> Result<String, minijinja::Error> {
        if let IssueBody::Freeform(text) = self {
            return Ok(text.clone());
        }
        environment()?
            .get_template("sections")?
            .render(context! { sections => self.sections() })
    }
}
