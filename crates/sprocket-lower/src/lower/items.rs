//! Signature phase: imports and function signatures of a unit.

use std::path::{Path, PathBuf};

use miette::SourceSpan;
use rustc_hash::FxHashMap;
use sprocket_ir::{NamespaceId, Signature, ValueId};
use sprocket_syntax::{FunctionDef, Import, Program, TopLevel};

use super::expr::lower_body;
use super::types::{resolve_return_type, resolve_type};
use super::{normalize, unit_name, Lowerer};
use crate::error::{GraphResultExt, LoweringError, Result};

/// Names visible at the top level of the unit being lowered.
pub(super) struct UnitScope {
    pub module: NamespaceId,
    pub dir: PathBuf,
    /// Import aliases: header or unit file stem to the imported namespace.
    pub aliases: FxHashMap<String, NamespaceId>,
}

impl UnitScope {
    fn bind(&mut self, alias: String, namespace: NamespaceId, span: SourceSpan) -> Result<()> {
        match self.aliases.get(&alias) {
            Some(existing) if *existing != namespace => Err(LoweringError::DuplicateAlias { alias, span }),
            Some(_) => Ok(()),
            None => {
                self.aliases.insert(alias, namespace);
                Ok(())
            }
        }
    }
}

impl Lowerer<'_> {
    /// Lowers one unit completely: all signatures first, then all bodies.
    pub(super) fn lower_unit(&mut self, program: &Program, path: &Path) -> Result<NamespaceId> {
        let module = self.graph.add_module(unit_name(path), path);
        self.modules.push(module);
        self.stack.push(path.to_path_buf());

        let mut unit = UnitScope {
            module,
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            aliases: FxHashMap::default(),
        };

        let mut pending: Vec<(&FunctionDef, ValueId)> = Vec::new();
        for top_level in &program.top_levels {
            match top_level {
                TopLevel::Import(import) => self.lower_import(&mut unit, import)?,
                TopLevel::Function(def) => {
                    let func = self.declare_signature(module, def)?;
                    pending.push((def, func));
                }
            }
        }

        for (def, func) in pending {
            lower_body(self.graph, &unit, def, func)?;
        }

        self.stack.pop();
        self.units.insert(path.to_path_buf(), module);
        log::debug!("lowered unit `{}`", path.display());
        Ok(module)
    }

    fn declare_signature(&mut self, module: NamespaceId, def: &FunctionDef) -> Result<ValueId> {
        let graph = &*self.graph;
        let params = def
            .params
            .iter()
            .map(|param| Ok((param.name.name.clone(), resolve_type(graph, &param.ty)?)))
            .collect::<Result<Vec<_>>>()?;
        let ret = resolve_return_type(graph, def.ret.as_ref())?;
        let sig = Signature::new(def.name.name.clone(), params, ret);
        log::trace!("declaring `{}`", def.name.name);
        self.graph.declare_function(module, &sig).at(def.name.span)
    }

    fn lower_import(&mut self, unit: &mut UnitScope, import: &Import) -> Result<()> {
        let span: SourceSpan = import.span.into();
        let file = Path::new(&import.file);
        let alias = unit_name(file);

        let namespace = match file.extension().and_then(|ext| ext.to_str()) {
            Some("h") => {
                let spec = self
                    .registry
                    .lookup(&import.file)
                    .ok_or_else(|| LoweringError::UnknownForeignModule {
                        header: import.file.clone(),
                        span,
                    })?;
                let key = spec.key();
                match self.foreign.get(&key) {
                    Some((namespace, _)) => *namespace,
                    None => {
                        let namespace = spec.instantiate(self.graph, span)?;
                        self.foreign.insert(key, (namespace, spec.source.clone()));
                        namespace
                    }
                }
            }
            Some("spng") => {
                let target = normalize(&unit.dir.join(file));
                self.import_unit(&target, span)?
            }
            _ => {
                return Err(LoweringError::UnsupportedImport {
                    file: import.file.clone(),
                    span,
                })
            }
        };

        log::trace!("bound import `{}` as `{}`", import.file, alias);
        unit.bind(alias, namespace, span)
    }

    fn import_unit(&mut self, target: &Path, span: SourceSpan) -> Result<NamespaceId> {
        if let Some(module) = self.units.get(target) {
            return Ok(*module);
        }
        if let Some(start) = self.stack.iter().position(|unit| unit == target) {
            let mut cycle = self.stack[start..].to_vec();
            cycle.push(target.to_path_buf());
            return Err(LoweringError::ImportCycle { cycle, span });
        }

        let program = self.loader.load(target).map_err(|source| LoweringError::Load {
            path: target.to_path_buf(),
            source,
            span,
        })?;
        log::debug!("lowering imported unit `{}`", target.display());
        self.lower_unit(&program, target)
    }
}
