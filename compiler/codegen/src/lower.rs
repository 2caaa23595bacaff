//! Lowering from the service model to the declaration IR.

use model::{Operation, Service, Shape, ShapeRef};
use normalization::{exportable, godoc, snake_case};

use crate::ir::{ClientDecl, FieldDecl, MethodDecl, StructDecl};
use crate::protocol::Protocol;
use crate::{GeneratorOptions, Result};

/// Lowers `service` into the declarations of its client module.
///
/// Operations and shapes are visited in name order and the emitted structs
/// are sorted by type name, so the result depends only on the model.
pub fn lower(service: &Service, protocol: Protocol, options: &GeneratorOptions) -> Result<ClientDecl> {
    let methods = service
        .operations
        .values()
        .map(|op| lower_operation(service, protocol, op))
        .collect::<Result<Vec<_>>>()?;

    let mut structs = Vec::new();
    for shape in service.structures() {
        tracing::debug!(shape = %shape.name, "lowering structure");
        structs.push(StructDecl {
            name: shape.exported_name(),
            docs: godoc(&shape.name, &shape.documentation),
            rename: None,
            fields: lower_fields(service, protocol, shape)?,
        });
    }

    if protocol.uses_result_wrappers() {
        for (wrapper, shape) in service.wrappers()? {
            let name = exportable(&wrapper);
            tracing::debug!(wrapper = %wrapper, shape = %shape.name, "lowering result wrapper");
            structs.push(StructDecl {
                docs: format!("/// {name} is a wrapper for {}.\n", shape.exported_name()),
                name,
                rename: Some(format!(
                    "{}Response",
                    wrapper.strip_suffix("Result").unwrap_or(&wrapper)
                )),
                fields: lower_fields(service, protocol, shape)?,
            });
        }
    }
    structs.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(ClientDecl {
        name: service.name.clone(),
        full_name: service.full_name.clone(),
        docs: module_docs(service),
        runtime: options.runtime_crate.clone(),
        protocol,
        endpoint_prefix: service.metadata.endpoint_prefix.clone(),
        settings: protocol.settings(&service.metadata),
        methods,
        structs,
    })
}

fn module_docs(service: &Service) -> String {
    let mut docs = format!("//! {} provides a client for {}.\n", service.package_name, service.full_name);
    if !service.documentation.trim().is_empty() {
        docs.push_str("//!\n");
        for line in godoc("", &service.documentation).lines() {
            docs.push_str(&line.replacen("///", "//!", 1));
            docs.push('\n');
        }
    }
    docs
}

fn lower_operation(service: &Service, protocol: Protocol, op: &Operation) -> Result<MethodDecl> {
    tracing::debug!(operation = %op.name, "lowering operation");
    let input = op.input_shape(service)?;
    let output = op.output_shape(service)?;

    Ok(MethodDecl {
        ident: snake_case(&op.exported_name()),
        op_name: op.name.clone(),
        docs: godoc(&op.name, &op.documentation),
        http_method: op.http.method.clone(),
        request_uri: op.http.request_uri.clone(),
        input: operation_type(service, protocol, op.input.as_ref(), input)?,
        output: operation_type(service, protocol, op.output.as_ref(), output)?,
    })
}

/// Type an operation's input or output is passed as. Query operations with
/// a result wrapper use the wrapper type instead of the wrapped shape.
fn operation_type(
    service: &Service,
    protocol: Protocol,
    shape_ref: Option<&ShapeRef>,
    shape: Option<&Shape>,
) -> Result<Option<String>> {
    let (Some(shape_ref), Some(shape)) = (shape_ref, shape) else {
        return Ok(None);
    };
    if protocol.uses_result_wrappers() && !shape_ref.result_wrapper.is_empty() {
        return Ok(Some(exportable(&shape_ref.result_wrapper)));
    }
    Ok(Some(shape.rust_type(service)?.to_string()))
}

/// One field per member of `shape`, sorted by member name.
///
/// Members that are not required become `Option<_>`. Members that lead back
/// to `shape` through structures alone are boxed, and always optional since a
/// required recursive member has no finite value.
fn lower_fields(service: &Service, protocol: Protocol, shape: &Shape) -> Result<Vec<FieldDecl>> {
    shape
        .members(service)?
        .into_iter()
        .map(|member| {
            let mut ty = member.shape.rust_type(service)?;
            let recursive = service.needs_indirection(shape, member.shape)?;
            if recursive {
                ty = ty.boxed();
            }
            if recursive || !member.required {
                ty = ty.optional();
            }

            let documentation = member.documentation();
            Ok(FieldDecl {
                ident: snake_case(&member.exported_name()),
                wire_name: protocol.wire_name(&member),
                ty,
                docs: if documentation.trim().is_empty() {
                    String::new()
                } else {
                    godoc(member.name, documentation)
                },
            })
        })
        .collect()
}
