use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    reflect::TypePath,
};

use crate::{errors::AssetLoaderError, rig::definition::RigDefinition};

#[derive(Default, TypePath)]
pub struct RigDefinitionLoader;

impl AssetLoader for RigDefinitionLoader {
    type Asset = RigDefinition;
    type Settings = ();
    type Error = AssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes).await?;
        let rig: RigDefinition = ron::de::from_bytes(&bytes)?;

        Ok(rig)
    }

    fn extensions(&self) -> &[&str] {
        &["rig.ron"]
    }
}
