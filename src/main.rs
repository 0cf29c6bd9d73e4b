use clap::Parser;
use gpc_matcher::app::{build_matcher, MatchRequest, MatchService};
use gpc_matcher::utils::error::{ErrorCategory, MatchError};
use gpc_matcher::utils::logger;
use gpc_matcher::CliConfig;

/// 3 表示分類來源無法讀取（服務離線或快照檔不存在）
fn exit_code(e: &MatchError, during_lookup: bool) -> i32 {
    match e {
        _ if e.category() == ErrorCategory::Provider => 3,
        MatchError::IoError(_) if during_lookup => 3,
        _ => 1,
    }
}

fn fail(e: &MatchError, code: i32) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 合併設定檔與命令列參數
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            fail(&e, exit_code(&e, false))
        }
    };

    logger::init_cli_logger(cli.verbose, config.log_level());
    tracing::info!("🚀 Starting gpc-matcher");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let matcher = match build_matcher(&config) {
        Ok(matcher) => matcher,
        Err(e) => fail(&e, exit_code(&e, false)),
    };
    let service = MatchService::new(matcher);

    for description in &cli.descriptions {
        if cli.explain {
            match service.matcher().try_best_match(description).await {
                Ok(result) => println!("{}", serde_json::to_string(&result)?),
                Err(e) => fail(&e, exit_code(&e, true)),
            }
        } else {
            let reply = service.reply(&MatchRequest::new(description.as_str())).await;
            println!("{}", reply.body);
        }
    }

    Ok(())
}
