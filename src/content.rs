use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, FolioResult};

/// Everything shown on the page, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    pub name: String,
    pub nav: Vec<Link>,
    /// Typed out character by character; newlines are kept.
    pub intro: String,
    pub bio: Vec<String>,
    pub projects_heading: String,
    pub projects: Vec<Project>,
    pub extra: Option<Section>,
    pub press_heading: String,
    pub press: Vec<Article>,
    pub contact: Contact,
    pub socials_heading: String,
    pub socials: Vec<Social>,
    pub footer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    #[serde(default = "placeholder_url")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub partnership: Option<String>,
    pub metric: Option<String>,
    #[serde(default = "placeholder_url")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub publication: String,
    #[serde(default = "placeholder_url")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub heading: String,
    pub blurb: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Social {
    pub platform: String,
    pub username: String,
    #[serde(default = "placeholder_url")]
    pub url: String,
}

/// What an animated card is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSpec {
    pub title: String,
    pub subtitle: String,
    pub color_index: isize,
    pub url: String,
}

fn placeholder_url() -> String {
    "#".to_string()
}

impl Portfolio {
    /// Load from a `.toml` or `.json` file. Missing fields fall back to the
    /// built-in page.
    pub fn load(path: &Path) -> FolioResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|source| FolioError::Toml {
                path: path.to_path_buf(),
                source,
            }),
            Some("json") => serde_json::from_str(&contents).map_err(|source| FolioError::Json {
                path: path.to_path_buf(),
                source,
            }),
            other => Err(FolioError::content(format!(
                "unsupported content file extension {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    /// Press articles as animated cards, colored by position.
    pub fn cards(&self) -> Vec<CardSpec> {
        self.press
            .iter()
            .enumerate()
            .map(|(i, a)| CardSpec {
                title: a.title.clone(),
                subtitle: a.publication.clone(),
                color_index: i as isize,
                url: a.url.clone(),
            })
            .collect()
    }
}

impl Default for Contact {
    fn default() -> Self {
        Contact {
            heading: "Get in Touch".into(),
            blurb: "Feel free to reach out to me at".into(),
            email: "your.email@example.com".into(),
        }
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        let link = |label: &str| Link {
            label: label.into(),
            url: placeholder_url(),
        };
        let project = |name: &str, description: &str, partnership: Option<&str>, metric: Option<&str>| Project {
            name: name.into(),
            description: description.into(),
            partnership: partnership.map(Into::into),
            metric: metric.map(Into::into),
            url: placeholder_url(),
        };
        let article = |n: u32| Article {
            title: format!("Article Title {n}"),
            publication: format!("Publication Name {n}"),
            url: placeholder_url(),
        };
        let social = |platform: &str, username: &str| Social {
            platform: platform.into(),
            username: username.into(),
            url: placeholder_url(),
        };

        Portfolio {
            name: "Ryan Manthy".into(),
            nav: vec![link("Contact"), link("Resume")],
            intro: "Hey, 👋\nI'm a designer, engineer,\nand civic organizer\nwho enjoys building cool stuff for\ngovernments, non-profits, and biologists".into(),
            bio: vec![
                "I'm in my last year studying computer science and biomedical engineering at Illinois Tech. \
                 Right now, I'm creating software to get out the vote in Pennsylvania and Arizona with New Voters \
                 and building GovGoose, a RAG Model for state and local government."
                    .into(),
                "I've previously worked at the Chan Zuckerberg Initiative, U.S. Department of Health and Human Services, \
                 Kaplan Institute, and Dom's Kitchen & Market (Closed in 2024). I am a 2022 Obama Chesky Voyager Scholar \
                 and 2024 Student Laureate for the Abraham Lincoln Civic Engagement Award."
                    .into(),
                "My experience has spanned design, software engineering, and business development in government, \
                 healthcare, and biotechnology. Available for Work Fall 2024"
                    .into(),
            ],
            projects_heading: "Projects and initiatives:".into(),
            projects: vec![
                project(
                    "Youth Civic Hub",
                    "centralized civic information tool for NYC youth",
                    Some("built in partnership with NYC Office of Public Engagement"),
                    None,
                ),
                project(
                    "CELLxGENE Explorer",
                    "conducted a post-launch usability test of visualization tool",
                    None,
                    None,
                ),
                project(
                    "teen.vote",
                    "tool to run voter registration drives and engage young people in civics",
                    None,
                    Some("10k+ students engaged annually"),
                ),
                project(
                    "CancerX Data Sprint",
                    "proposed data sprint to promote interoperability of oncology data",
                    None,
                    None,
                ),
            ],
            extra: Some(Section {
                heading: "Another Text Option".into(),
                body: "This section can be used for additional descriptions, skills, or any other \
                       information you'd like to highlight."
                    .into(),
            }),
            press_heading: "Featured Press".into(),
            press: (1..=4).map(article).collect(),
            contact: Contact::default(),
            socials_heading: "Socials".into(),
            socials: vec![
                social("Twitter", "@yourusername"),
                social("GitHub", "yourusername"),
                social("LinkedIn", "yourname"),
            ],
            footer: "© 2024 Ryan Manthy. All rights reserved.".into(),
        }
    }
}
