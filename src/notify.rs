use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Default,
    Destructive,
}

/// A user-facing message: short title, descriptive body, severity.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

impl Notice {
    pub fn is_destructive(&self) -> bool {
        self.severity == Severity::Destructive
    }
}

/// Fire-and-forget notice sender. A dropped receiver never fails the
/// operation that produced the notice.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Notice>,
}

impl Notifier {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notice>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    pub async fn info(&self, title: &str, body: &str) {
        self.push(title, body, Severity::Default).await;
    }

    pub async fn destructive(&self, title: &str, body: &str) {
        self.push(title, body, Severity::Destructive).await;
    }

    async fn push(&self, title: &str, body: &str, severity: Severity) {
        let notice = Notice {
            title: title.to_string(),
            body: body.to_string(),
            severity,
        };
        let _ = self.tx.send(notice).await;
    }
}
