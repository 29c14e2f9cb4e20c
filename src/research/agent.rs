use std::fmt;

use tracing::{info, warn};

use super::questions::generate_questions;
use super::report::{Report, compile_report};
use super::{QnaMap, ResearchError};
use crate::openai::CompletionClient;
use crate::shell::Shell;
use crate::tavily::SearchClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    GeneratingQuestions,
    SearchingWeb,
    CompilingReport,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::GeneratingQuestions => "generating-questions",
            Phase::SearchingWeb => "searching-web",
            Phase::CompilingReport => "compiling-report",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Input from the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    TopicEntered(String),
    GeneratePressed,
}

/// Drives one research run per `GeneratePressed`, start to finish.
///
/// Each press discards the previous run's results.
pub struct ResearchAgent<C, S> {
    completion: C,
    search: S,
    topic: String,
    phase: Phase,
    report: Option<Report>,
}

impl<C: CompletionClient, S: SearchClient> ResearchAgent<C, S> {
    pub fn new(completion: C, search: S) -> Self {
        Self {
            completion,
            search,
            topic: String::new(),
            phase: Phase::Idle,
            report: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub async fn handle(&mut self, event: Event, shell: &mut impl Shell) -> Phase {
        match event {
            Event::TopicEntered(topic) => {
                self.topic = topic.trim().to_string();
            }
            Event::GeneratePressed => {
                self.phase = Phase::Idle;
                self.report = None;
                if self.topic.is_empty() {
                    shell.warning("Please enter a topic.");
                } else {
                    self.run(shell).await;
                }
            }
        }
        self.phase
    }

    async fn run(&mut self, shell: &mut impl Shell) {
        let topic = self.topic.clone();
        info!(topic = %topic, "research started");

        self.enter(Phase::GeneratingQuestions, shell, "Generating research questions...");
        let questions = generate_questions(&self.completion, &topic)
            .await
            .unwrap_or_else(|e| report_failure(shell, e));
        shell.success("Questions generated!");

        self.enter(Phase::SearchingWeb, shell, "Searching the web for answers...");
        let qna = self.search_all(questions, shell).await;

        if qna.is_empty() {
            warn!("no questions to report on");
        }
        self.enter(Phase::CompilingReport, shell, "Compiling your report...");
        let report = compile_report(&topic, &qna);

        self.phase = Phase::Done;
        info!(
            questions = qna.len(),
            bytes = report.markdown().len(),
            "research complete"
        );
        shell.deliver(&report);
        self.report = Some(report);
    }

    async fn search_all(&self, questions: Vec<String>, shell: &mut impl Shell) -> QnaMap {
        let mut qna = QnaMap::new();
        for question in questions {
            shell.question(&question);
            let results = self
                .search
                .search(&question)
                .await
                .map_err(ResearchError::from)
                .unwrap_or_else(|e| report_failure(shell, e));
            info!(question = %question, results = results.len(), "question searched");
            qna.insert(question, results);
        }
        qna
    }

    fn enter(&mut self, phase: Phase, shell: &mut impl Shell, message: &str) {
        info!(from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
        shell.progress(phase, message);
    }
}

fn report_failure<T: Default>(shell: &mut impl Shell, e: ResearchError) -> T {
    warn!(error = %e, "step failed (continuing with empty result)");
    shell.error(&e.to_string());
    T::default()
}
