//! # Módulo de Telemetria - Logs Estruturados
//!
//! Configura o `tracing-subscriber` para o binário. A biblioteca só emite
//! eventos (`tracing::info!`, `debug!`, `warn!`); quem decide para onde eles
//! vão é este módulo.
//!
//! ## Para todos entenderem:
//!
//! Os logs vão para **stderr**. Assim o CSV pode ser enviado para stdout
//! (`--output -`) sem ficar misturado com mensagens.
//!
//! ## Configuração via variáveis de ambiente:
//!
//! - `RUST_LOG`: filtro completo do `EnvFilter` (tem prioridade)
//! - `CONVERTER_LOG_LEVEL`: nível mínimo (`error`, `warn`, `info`, `debug`, `trace`)
//! - `CONVERTER_LOG_ANSI`: `false` desliga cores

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CONFIGURAÇÃO
// ============================================================================

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Nível de log mínimo quando `RUST_LOG` não está definido.
    pub log_level: Level,

    /// Se deve habilitar logging para console.
    pub enable_console_logging: bool,

    /// Cores ANSI no console.
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Level::WARN,
            enable_console_logging: true,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Cria configuração a partir de variáveis de ambiente.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("CONVERTER_LOG_LEVEL") {
            if let Ok(parsed) = level.parse::<Level>() {
                config.log_level = parsed;
            }
        }

        if let Ok(ansi) = std::env::var("CONVERTER_LOG_ANSI") {
            config.ansi = !matches!(ansi.to_lowercase().as_str(), "0" | "false" | "no" | "off");
        }

        config
    }

    /// Aumenta o nível conforme a quantidade de `-v` no CLI.
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.log_level = match verbose {
            0 => self.log_level,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        self
    }
}

// ============================================================================
// INICIALIZAÇÃO
// ============================================================================

/// Inicializa o subscriber global.
///
/// Chamar duas vezes não é erro: a segunda chamada é ignorada (útil em testes).
pub fn init_telemetry(config: TelemetryConfig) -> anyhow::Result<()> {
    // Primeiro tenta ler de RUST_LOG, senão usa o nível configurado.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = if config.enable_console_logging {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_ansi(config.ansi)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        subscriber.try_init()
    };

    if result.is_ok() {
        tracing::debug!(level = %config.log_level, "Telemetria inicializada");
    }
    Ok(())
}
