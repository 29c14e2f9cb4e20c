use super::QnaMap;
use crate::markdown::{escape_link_part, one_line};

/// A compiled research report, ready to display and download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    topic: String,
    markdown: String,
}

impl Report {
    pub const MIME: &'static str = "text/markdown";

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// `<topic with spaces as underscores>_report.md`
    pub fn file_name(&self) -> String {
        format!("{}_report.md", self.topic.replace(' ', "_"))
    }
}

pub fn compile_report(topic: &str, qna: &QnaMap) -> Report {
    let heading_topic = one_line(topic);
    let mut out = format!("# 📘 Research Report: {heading_topic}\n\n");
    out.push_str(&format!(
        "## 🧾 Introduction\nThis report explores the topic \"{heading_topic}\" through a series of structured research questions and web-based answers.\n\n"
    ));

    for (question, results) in qna.iter() {
        out.push_str(&format!("## ❓ {}\n", one_line(question)));
        for r in results {
            out.push_str(&format!(
                "- **{}**: {}\n  [🔗 Read More]({})\n",
                r.title,
                r.content,
                escape_link_part(&r.url)
            ));
        }
        out.push('\n');
    }

    out.push_str(
        "## ✅ Conclusion\nThis report compiles current online insights to offer a comprehensive understanding of the topic.",
    );

    Report {
        topic: topic.to_string(),
        markdown: out,
    }
}
