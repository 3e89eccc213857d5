//! Builds the configured services.

use std::sync::Arc;

use tracing::info;

use crate::backends::{RandomBoundaryLabeler, RemoteModel, SequenceLabeler};
use crate::config::{BackendConfig, BackendKind, Settings};
use crate::labeling::{PredictionCache, SentenceSplitter};

use super::dep::DependencyAnnotator;
use super::xpos::XposTagger;

/// The services a process runs with. A service whose backend is disabled is
/// `None`.
#[derive(Clone)]
pub struct Services {
    pub splitter: Option<Arc<SentenceSplitter>>,
    pub xpos: Option<Arc<XposTagger>>,
    pub dep: Option<Arc<DependencyAnnotator>>,
    pub cache: Arc<PredictionCache>,
}

impl Services {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate()?;
        let cache = Arc::new(PredictionCache::new(settings.cache_capacity()?));

        let labeler: Option<Arc<dyn SequenceLabeler>> = match settings.backends.sentence.kind {
            BackendKind::Remote => Some(Arc::new(remote("sentence", &settings.backends.sentence)?)),
            BackendKind::Random => Some(Arc::new(RandomBoundaryLabeler::new(
                &settings.splitter.begin_label,
            ))),
            BackendKind::Disabled => None,
        };
        let splitter = match labeler {
            Some(labeler) => Some(Arc::new(SentenceSplitter::new(
                labeler,
                Arc::clone(&cache),
                settings.splitter_options()?,
            ))),
            None => None,
        };

        let xpos = match settings.backends.xpos.kind {
            BackendKind::Remote => Some(Arc::new(XposTagger::new(Arc::new(remote(
                "xpos",
                &settings.backends.xpos,
            )?)))),
            _ => None,
        };
        let dep = match settings.backends.dep.kind {
            BackendKind::Remote => Some(Arc::new(DependencyAnnotator::new(Arc::new(remote(
                "dep",
                &settings.backends.dep,
            )?)))),
            _ => None,
        };

        info!(
            sentence = %settings.backends.sentence.kind,
            xpos = %settings.backends.xpos.kind,
            dep = %settings.backends.dep.kind,
            "Services configured"
        );

        Ok(Self {
            splitter,
            xpos,
            dep,
            cache,
        })
    }
}

fn remote(name: &str, config: &BackendConfig) -> anyhow::Result<RemoteModel> {
    let endpoint = config
        .endpoint
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("backends.{} has no endpoint", name))?;
    Ok(RemoteModel::new(name, endpoint, config.timeout())?)
}
