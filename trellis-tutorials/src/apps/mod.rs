//! The tutorial applications, one root module each

pub mod basics;
pub mod dependency_injection;
pub mod modules;
pub mod pipes;
pub mod routing;
pub mod services;

use crate::config::{AppConfig, TutorialApp};
use tracing::info;
use trellis_core::{Application, Error};

/// Bootstrap the tutorial `config` selects
pub async fn bootstrap(config: &AppConfig) -> Result<Application, Error> {
    info!(app = config.app.as_str(), "Starting tutorial");
    match config.app {
        TutorialApp::Basics => Application::create(basics::BasicsModule),
        TutorialApp::Services => Application::create(services::ServicesModule),
        TutorialApp::Pipes => Application::create(pipes::PipesAppModule),
        TutorialApp::Routing => Application::create(routing::RoutingModule),
        TutorialApp::DependencyInjection => {
            dependency_injection::bootstrap(config.di.clone()).await
        }
        TutorialApp::Modules => Application::create(modules::ModulesAppModule),
    }
}
