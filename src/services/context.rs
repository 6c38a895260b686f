//! # مهلت و لغو عملیات (CallContext)
//!
//! هر عملیات سرویس میتونه با یک `CallContext` اجرا بشه که:
//! - یک مهلت (deadline) داره
//! - یک `CancellationToken` داره که caller میتونه هر وقت خواست cancel کنه
//!
//! ## چرا لغو امنه؟
//! در Rust لغو یعنی drop شدن future. همه نوشتن‌ها داخل یک تراکنش sqlx
//! انجام میشن و تراکنش بدون commit موقع drop خودکار rollback میشه.
//! پس یک `record_click` لغو شده یا هم شمارنده و هم کلیک رو نوشته یا هیچکدوم.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{AppError, Result};

/// مهلت و سیگنال لغو برای یک فراخوانی
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}

impl CallContext {
    /// بدون مهلت و بدون لغو از بیرون
    #[must_use]
    pub fn background() -> Self {
        Self {
            deadline: None,
            cancel: CancellationToken::new(),
        }
    }

    /// با مهلت نسبی از همین الان
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().timeout(timeout)
    }

    /// تنظیم مهلت؛ اگه مهلت قبلی زودتر باشه همون میمونه
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// وصل کردن به یک token والد (مثلا token خاموش شدن سرور)
    ///
    /// لغو والد این context رو هم لغو میکنه، ولی نه برعکس.
    #[must_use]
    pub fn child_of(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// token لغو این context
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// لغو همه عملیات‌هایی که با این context اجرا میشن
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// اجرای یک future با رعایت مهلت و لغو
    ///
    /// # Errors
    /// - `Cancelled`: اگه token لغو بشه
    /// - `Timeout`: اگه مهلت تموم بشه
    /// - هر خطایی که خود future برگردونه
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => {
                debug!("Operation cancelled by caller");
                Err(AppError::Cancelled)
            }
            _ = deadline => {
                debug!("Operation deadline exceeded");
                Err(AppError::Timeout)
            }
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let value = ctx.run(async { Ok::<_, AppError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_run() {
        let ctx = CallContext::background();
        ctx.cancel();

        let result = ctx.run(async { Ok::<_, AppError>(()) }).await;
        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        let ctx = CallContext::with_timeout(Duration::from_millis(10));

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, AppError>(())
            })
            .await;
        assert!(matches!(result, Err(AppError::Timeout)));
    }

    #[tokio::test]
    async fn test_parent_cancellation_propagates() {
        let shutdown = CancellationToken::new();
        let ctx = CallContext::background().child_of(&shutdown);

        shutdown.cancel();
        assert!(ctx.cancellation_token().is_cancelled());
    }

    #[test]
    fn test_timeout_keeps_earliest_deadline() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        rt.block_on(async {
            let ctx = CallContext::with_timeout(Duration::from_secs(1))
                .timeout(Duration::from_secs(100));
            let remaining = ctx.deadline.unwrap() - Instant::now();
            assert!(remaining <= Duration::from_secs(1));
        });
    }
}
