//! Standalone daily collector CLI.

use airq_collector::{config, modules, CollectorConfig, Result};
use airq_data::{AirQualityCollector, OpenWeatherClient, ReadingStore};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "airq-collector")]
#[command(about = "Aguachica Air Quality Daily Collector", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 현재 데이터 수집 (전체 지점)
    Collect {
        /// 특정 지점만 수집 (지점 id, 예: "parque_central")
        #[arg(long)]
        location: Option<String>,
    },

    /// 과거 데이터 백필 (최근 5일)
    Backfill,

    /// 일일 통합 수집 (현재 + 백필, 기본 명령)
    RunDaily,

    /// 데몬 모드: 주기적으로 일일 통합 수집 실행
    Daemon,

    /// 저장소 수집 현황 조회 (API 키 불필요)
    Status {
        /// 지점별 최근 측정값 조회 수
        #[arg(long, default_value_t = 5)]
        recent: i64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "airq_collector={level},airq_data={level}",
                    level = cli.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 모든 예기치 못한 에러는 이 경계에서 종료 코드 1로 변환
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "치명적 오류");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    tracing::info!("Aguachica Air Quality Collector 시작");

    // 설정 로드
    let config = CollectorConfig::from_env()?;
    tracing::debug!(database_path = %config.database_path, "설정 로드 완료");

    let command = cli.command.unwrap_or(Commands::RunDaily);

    // 상태 조회는 API를 호출하지 않으므로 키 게이트 이전에 처리
    if let Commands::Status { recent } = command {
        let store = ReadingStore::connect(&config.database_path).await?;
        store.init().await?;
        let statuses =
            modules::collect_status(&store, &airq_core::default_locations(), recent).await?;
        modules::log_status(&statuses);
        return Ok(true);
    }

    // API 키 로드 (환경변수 → config.json), 키가 없으면 수집기 생성 없이 종료
    let api_key = config::load_api_key()?;
    let success = config::with_api_key(api_key, |key| run_command(command, &config, key)).await?;

    tracing::info!("Aguachica Air Quality Collector 종료");
    Ok(success)
}

async fn run_command(command: Commands, config: &CollectorConfig, api_key: String) -> Result<bool> {
    // 저장소 연결
    let store = ReadingStore::connect(&config.database_path).await?;
    store.init().await?;
    tracing::info!(path = %config.database_path, "데이터베이스 연결 성공");

    // 수집기 생성
    let client = OpenWeatherClient::new(api_key);
    let mut collector = AirQualityCollector::new(client, store)
        .with_request_delays(
            config.current_collect.request_delay(),
            config.backfill.request_delay(),
        )
        .with_backfill_window(config.backfill.days, config.backfill.buffer_secs);
    tracing::info!(locations = collector.locations().len(), "측정 지점 설정 완료");

    // 명령 실행
    let success = match command {
        Commands::Collect { location } => match location {
            Some(id) => {
                let saved = collector.collect_single_location(&id).await?;
                if saved {
                    tracing::info!(location = %id, "수집 완료, 새 측정값 저장");
                } else {
                    tracing::info!(location = %id, "수집 완료, 같은 시각 측정값이 이미 있어 건너뜀");
                }
                true
            }
            None => {
                let (successful, failed) = collector.collect_all_locations().await?;
                tracing::info!(successful, failed, "수집 완료");
                successful > 0
            }
        },
        Commands::Backfill => {
            let totals = modules::run_backfill_phase(&mut collector).await;
            tracing::info!(saved = totals.saved, "백필 완료");
            totals.saved > 0
        }
        Commands::RunDaily => {
            let summary = modules::run_daily(&mut collector).await;
            summary.overall_success()
        }
        Commands::Daemon => {
            tracing::info!(
                "=== 데몬 모드 시작 (주기: {}분) ===",
                config.daemon.interval_minutes
            );

            let mut interval = tokio::time::interval(config.daemon.interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("종료 신호 수신, 데몬 종료 중...");
                        break;
                    }
                    _ = interval.tick() => {
                        let summary = modules::run_daily(&mut collector).await;
                        if !summary.overall_success() {
                            tracing::warn!("이번 실행에서 저장된 데이터가 없습니다");
                        }
                        tracing::info!(
                            "=== 다음 실행: {}분 후 ===",
                            config.daemon.interval_minutes
                        );
                    }
                }
            }
            true
        }
        // run()에서 키 게이트 이전에 처리됨
        Commands::Status { .. } => true,
    };

    Ok(success)
}
