//! Elective recommendations from a chat-completions model.
//!
//! The planner never depends on this module; onboarding receives a
//! `Recommender` and treats every failure as "no recommendations".

pub mod dto;

use std::env;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use crate::error::AppError;
use crate::models::{Course, CourseRecommendation, Student};

pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const FEASIBILITY_FALLBACK: &str = "Unable to analyze plan feasibility at this time.";

static COURSE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{2,4}\s\d{3}[A-Z]?)").expect("valid course regex"));
static SCORE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}$").expect("valid score regex"));

#[derive(Clone, Debug)]
pub struct RecommenderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl RecommenderConfig {
    /// `Ok(None)` when no API key is configured.
    pub fn new_from_env() -> Result<Option<Self>, AppError> {
        let Some(api_key) = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()) else {
            return Ok(None);
        };
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Some(Self {
            api_key,
            model,
            base_url,
        }))
    }
}

#[async_trait]
pub trait Recommender: Send + Sync {
    /// Ranked suggestions drawn from `candidates`, best first.
    async fn recommend(
        &self,
        student: &Student,
        candidates: &[Course],
    ) -> Result<Vec<CourseRecommendation>, AppError>;

    /// Free-text review of course load and sequencing.
    async fn analyze_feasibility(
        &self,
        student: &Student,
        courses: &[Course],
    ) -> Result<String, AppError>;
}

pub struct OpenAiRecommender {
    client: Client,
    config: RecommenderConfig,
}

impl OpenAiRecommender {
    pub fn new(config: RecommenderConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn complete(&self, prompt: String, max_tokens: u32) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let request_body = dto::ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![dto::ChatMessage {
                role: "user".to_string(),
                content: Some(prompt),
            }],
            temperature: 0.7,
            max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Completion API error {}: {}", status, body)));
        }

        let parsed: dto::ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse completion: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::Upstream("Completion had no content".to_string()))
    }
}

#[async_trait]
impl Recommender for OpenAiRecommender {
    async fn recommend(
        &self,
        student: &Student,
        candidates: &[Course],
    ) -> Result<Vec<CourseRecommendation>, AppError> {
        let reply = self.complete(recommendation_prompt(student, candidates), 1000).await?;
        let recommendations = parse_recommendations(&reply, candidates);
        tracing::debug!(
            "Parsed {} recommendations from completion",
            recommendations.len()
        );
        Ok(recommendations)
    }

    async fn analyze_feasibility(
        &self,
        student: &Student,
        courses: &[Course],
    ) -> Result<String, AppError> {
        self.complete(feasibility_prompt(student, courses), 500).await
    }
}

pub struct NoopRecommender;

#[async_trait]
impl Recommender for NoopRecommender {
    async fn recommend(
        &self,
        _student: &Student,
        _candidates: &[Course],
    ) -> Result<Vec<CourseRecommendation>, AppError> {
        Ok(Vec::new())
    }

    async fn analyze_feasibility(
        &self,
        _student: &Student,
        _courses: &[Course],
    ) -> Result<String, AppError> {
        Ok(FEASIBILITY_FALLBACK.to_string())
    }
}

pub fn recommendation_prompt(student: &Student, candidates: &[Course]) -> String {
    let courses = candidates
        .iter()
        .map(|c| {
            format!(
                "- {}: {}\n  Description: {}\n  Topics: {}\n  Career Relevance: {}",
                c.code,
                c.name,
                c.description.as_deref().unwrap_or(""),
                c.topics.join(", "),
                c.career_relevance.join(", "),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "As an academic advisor, recommend elective courses for a student with the following profile:\n\
         - Major: {}\n\
         - Career Goals: {}\n\
         - Interests: {}\n\n\
         Available courses:\n{}\n\n\
         Provide recommendations in the following format for each course, one item per line:\n\
         1. Course code\n\
         2. Relevance score (1-100)\n\
         3. Brief explanation of why this course aligns with the student's goals and interests\n",
        student.major.as_deref().unwrap_or("Undeclared"),
        student.career_goals.as_deref().unwrap_or(""),
        student.interests.join(", "),
        courses,
    )
}

pub fn feasibility_prompt(student: &Student, courses: &[Course]) -> String {
    let listed = courses
        .iter()
        .map(|c| {
            let prereqs = if c.prerequisites.is_empty() {
                "None".to_string()
            } else {
                c.prerequisites.join(", ")
            };
            format!(
                "- {}: {} ({} credits)\n  Prerequisites: {}",
                c.code, c.name, c.credits, prereqs
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze the feasibility of this academic plan for a student with the following profile:\n\
         - Major: {}\n\
         - Career Goals: {}\n\
         - Max Credits per Semester: {}\n\
         - Including Summer Terms: {}\n\n\
         Recommended Courses:\n{}\n\n\
         Provide a brief analysis of:\n\
         1. Course load balance\n\
         2. Prerequisite sequence\n\
         3. Alignment with career goals\n\
         4. Potential challenges\n\
         5. Suggestions for improvement\n",
        student.major.as_deref().unwrap_or("Undeclared"),
        student.career_goals.as_deref().unwrap_or(""),
        student.preferences.max_credits_per_semester,
        student.preferences.include_summer,
        listed,
    )
}

/// Reads a line-oriented reply: a course code opens an entry, a bare number
/// is its score, any other text its reasoning. Codes not among `candidates`
/// are dropped. Sorted by descending score.
pub fn parse_recommendations(reply: &str, candidates: &[Course]) -> Vec<CourseRecommendation> {
    let mut recommendations = Vec::new();
    let mut current: Option<CourseRecommendation> = None;
    let mut in_unknown = false;

    for line in reply.lines().map(str::trim) {
        if let Some(caps) = COURSE_LINE.captures(line) {
            if let Some(done) = current.take() {
                recommendations.push(done);
            }
            let code = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            current = candidates
                .iter()
                .find(|c| c.code == code)
                .map(|course| CourseRecommendation {
                    course: course.clone(),
                    relevance_score: 1,
                    reasoning: String::new(),
                });
            in_unknown = current.is_none();
        } else if in_unknown {
            continue;
        } else if SCORE_LINE.is_match(line) {
            if let (Some(rec), Ok(score)) = (current.as_mut(), line.parse::<u32>()) {
                rec.relevance_score = score.clamp(1, 100) as u8;
            }
        } else if !line.is_empty() {
            if let Some(rec) = current.as_mut() {
                rec.reasoning = line.to_string();
            }
        }
    }

    if let Some(done) = current {
        recommendations.push(done);
    }

    recommendations.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    recommendations
}
