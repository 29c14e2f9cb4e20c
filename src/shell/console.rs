use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use super::Shell;
use crate::research::{Phase, Report};

const RULE: &str = "----------------------------------------";

/// Terminal rendering of the research page. "Download" saves the report into `output_dir`.
pub struct ConsoleShell<W: Write> {
    out: W,
    output_dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl<W: Write> ConsoleShell<W> {
    pub fn new(out: W, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            out,
            output_dir: output_dir.into(),
            saved: Vec::new(),
        }
    }

    /// Paths of every report saved during this session.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    pub fn banner(&mut self) {
        self.line("🧠 AI Web Research Agent");
        self.line("Powered by GPT & Tavily");
        self.line("");
        self.line("How it works:");
        self.line("  1. Enter a topic you're interested in.");
        self.line("  2. The AI generates key research questions.");
        self.line("  3. It performs web searches using Tavily.");
        self.line("  4. All results are compiled into a downloadable markdown report.");
        self.line("");
    }

    pub fn prompt(&mut self) {
        let _ = write!(self.out, "🔍 Enter a research topic: ");
        let _ = self.out.flush();
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
    }

    fn save(&self, report: &Report) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(disk_file_name(&report.file_name()));
        std::fs::write(&path, report.markdown())?;
        Ok(path)
    }
}

/// One line read from the terminal.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Topic(String),
    NotUtf8,
}

/// Reads the next input line without its line ending. `None` at end of input.
///
/// A line that is not valid UTF-8 is consumed and reported as `Input::NotUtf8`.
pub async fn read_input<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<Option<Input>> {
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.ends_with(b"\n") {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }
    Ok(Some(match std::str::from_utf8(buf) {
        Ok(text) => Input::Topic(text.to_string()),
        Err(_) => Input::NotUtf8,
    }))
}

/// Path separators in the topic would escape `output_dir`.
fn disk_file_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

impl<W: Write> Shell for ConsoleShell<W> {
    fn progress(&mut self, phase: Phase, message: &str) {
        let icon = match phase {
            Phase::GeneratingQuestions => "🤖",
            Phase::SearchingWeb => "🌐",
            Phase::CompilingReport => "📝",
            Phase::Idle | Phase::Done => "",
        };
        self.line(&format!("{icon} {message}"));
    }

    fn success(&mut self, message: &str) {
        self.line(&format!("✅ {message}"));
    }

    fn warning(&mut self, message: &str) {
        self.line(&format!("⚠️  {message}"));
    }

    fn error(&mut self, message: &str) {
        self.line(&format!("❌ {message}"));
    }

    fn question(&mut self, question: &str) {
        self.line(&format!("🔍 {question}"));
    }

    fn deliver(&mut self, report: &Report) {
        self.line(RULE);
        self.line(&format!("📄 Final Research Report: {}", report.topic()));
        self.line("");
        self.line(report.markdown());
        self.line("");
        self.line(RULE);

        match self.save(report) {
            Ok(path) => {
                info!(path = %path.display(), mime = Report::MIME, "report saved");
                self.line(&format!("📥 Report saved to {}", path.display()));
                self.saved.push(path);
            }
            Err(e) => {
                warn!(error = %e, "failed to save report");
                self.error(&format!(
                    "Could not save {} to {}: {e}",
                    report.file_name(),
                    display_dir(&self.output_dir)
                ));
            }
        }
    }
}

fn display_dir(dir: &Path) -> String {
    if dir.as_os_str().is_empty() {
        ".".to_string()
    } else {
        dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::QnaMap;
    use crate::research::report::compile_report;

    fn rendered(shell: ConsoleShell<Vec<u8>>) -> String {
        String::from_utf8(shell.out).unwrap()
    }

    #[test]
    fn deliver_prints_and_saves_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = ConsoleShell::new(Vec::new(), dir.path());
        let report = compile_report("AI in agriculture", &QnaMap::new());

        shell.deliver(&report);

        let expected = dir.path().join("AI_in_agriculture_report.md");
        assert_eq!(shell.saved(), [expected.clone()]);
        assert_eq!(std::fs::read_to_string(&expected).unwrap(), report.markdown());

        let out = rendered(shell);
        assert!(out.contains("Final Research Report: AI in agriculture"));
        assert!(out.contains("# 📘 Research Report: AI in agriculture"));
        assert!(out.contains("Report saved to"));
    }

    #[test]
    fn deliver_keeps_file_inside_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut shell = ConsoleShell::new(Vec::new(), dir.path());
        let report = compile_report("../etc/passwd", &QnaMap::new());

        shell.deliver(&report);

        assert_eq!(shell.saved(), [dir.path().join(".._etc_passwd_report.md")]);
    }

    #[test]
    fn deliver_reports_save_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();
        let mut shell = ConsoleShell::new(Vec::new(), &blocker);

        shell.deliver(&compile_report("topic", &QnaMap::new()));

        assert!(shell.saved().is_empty());
        assert!(rendered(shell).contains("❌ Could not save topic_report.md"));
    }

    #[test]
    fn sinks_render_one_line_each() {
        let mut shell = ConsoleShell::new(Vec::new(), ".");
        shell.progress(Phase::SearchingWeb, "Searching the web for answers...");
        shell.question("What are the costs?");
        shell.warning("Please enter a topic.");
        shell.error("Web search error: boom");

        assert_eq!(
            rendered(shell),
            "🌐 Searching the web for answers...\n\
             🔍 What are the costs?\n\
             ⚠️  Please enter a topic.\n\
             ❌ Web search error: boom\n"
        );
    }

    #[tokio::test]
    async fn read_input_skips_invalid_line_and_continues() {
        let mut reader: &[u8] = b"\xff\xfe bad\nAI in agriculture\r\nlast";
        let mut buf = Vec::new();

        assert_eq!(
            read_input(&mut reader, &mut buf).await.unwrap(),
            Some(Input::NotUtf8)
        );
        assert_eq!(
            read_input(&mut reader, &mut buf).await.unwrap(),
            Some(Input::Topic("AI in agriculture".into()))
        );
        assert_eq!(
            read_input(&mut reader, &mut buf).await.unwrap(),
            Some(Input::Topic("last".into()))
        );
        assert_eq!(read_input(&mut reader, &mut buf).await.unwrap(), None);
    }

    #[test]
    fn banner_lists_steps() {
        let mut shell = ConsoleShell::new(Vec::new(), ".");
        shell.banner();
        let out = rendered(shell);
        assert!(out.contains("How it works"));
        assert!(out.contains("4. All results are compiled"));
    }
}
