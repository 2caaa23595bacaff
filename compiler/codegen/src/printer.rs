//! Prints the declaration IR as Rust source.
//!
//! The output is syntactically complete but unformatted; it is meant to go
//! through `normalization::format_rust` afterwards. Every std and serde item
//! is named by absolute path because generated structs share the module
//! namespace and may be called `Option`, `Result` or `Default`.

use std::fmt::{self, Write};

use crate::ir::{ClientDecl, FieldDecl, MethodDecl, StructDecl};

/// Appends the client module to `out`.
pub fn print(decl: &ClientDecl, out: &mut String) -> fmt::Result {
    out.push_str(&decl.docs);
    writeln!(out)?;

    print_client(decl, out)?;
    for s in &decl.structs {
        writeln!(out)?;
        print_struct(s, out)?;
    }
    Ok(())
}

fn print_client(decl: &ClientDecl, out: &mut String) -> fmt::Result {
    let ClientDecl { name, full_name, runtime: rt, .. } = decl;
    let client_type = decl.protocol.client_type();

    writeln!(out, "/// {name} is a client for {full_name}.")?;
    writeln!(out, "pub struct {name} {{")?;
    writeln!(out, "client: {rt}::{client_type},")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "impl {name} {{")?;
    writeln!(out, "/// Returns a new {name} client.")?;
    writeln!(out, "///")?;
    writeln!(out, "/// When `client` is `None` the runtime's default HTTP client is used.")?;
    writeln!(
        out,
        "pub fn new(key: &str, secret: &str, region: &str, \
         client: ::std::option::Option<{rt}::HttpClient>) \
         -> ::std::result::Result<Self, {rt}::Error> {{"
    )?;
    writeln!(out, "let endpoint = {rt}::endpoints::lookup({:?}, region)?;", decl.endpoint_prefix)?;
    writeln!(out, "Ok({name} {{")?;
    writeln!(out, "client: {rt}::{client_type} {{")?;
    writeln!(out, "signer: {rt}::V4Signer {{")?;
    writeln!(out, "key: key.to_string(),")?;
    writeln!(out, "secret: secret.to_string(),")?;
    writeln!(out, "service: endpoint.signing_service,")?;
    writeln!(out, "region: endpoint.signing_region,")?;
    writeln!(out, "include_x_amz_content_sha256: true,")?;
    writeln!(out, "}},")?;
    writeln!(out, "client: client.unwrap_or_default(),")?;
    writeln!(out, "endpoint: endpoint.uri,")?;
    for (field, value) in &decl.settings {
        writeln!(out, "{field}: {value:?}.to_string(),")?;
    }
    writeln!(out, "}},")?;
    writeln!(out, "}})")?;
    writeln!(out, "}}")?;

    for method in &decl.methods {
        writeln!(out)?;
        print_method(method, rt, out)?;
    }
    writeln!(out, "}}")
}

fn print_method(method: &MethodDecl, rt: &str, out: &mut String) -> fmt::Result {
    out.push_str(&method.docs);
    if method.op_name != method.ident {
        writeln!(out, "#[doc(alias = {:?})]", method.op_name)?;
    }

    let params = match &method.input {
        Some(input) => format!(", req: {input}"),
        None => String::new(),
    };
    let returns = method.output.as_deref().unwrap_or("()");
    writeln!(
        out,
        "pub fn {}(&self{params}) -> ::std::result::Result<{returns}, {rt}::Error> {{",
        method.ident
    )?;

    let req = if method.input.is_some() { "Some(&req)" } else { "None::<&()>" };
    let call = |resp: &str| {
        format!(
            "self.client.call({:?}, {:?}, {:?}, {req}, {resp})",
            method.op_name, method.http_method, method.request_uri
        )
    };
    match &method.output {
        Some(output) => {
            writeln!(out, "let mut resp: {output} = ::core::default::Default::default();")?;
            writeln!(out, "{}?;", call("Some(&mut resp)"))?;
            writeln!(out, "Ok(resp)")?;
        }
        None => writeln!(out, "{}", call("None::<&mut ()>"))?,
    }
    writeln!(out, "}}")
}

fn print_struct(decl: &StructDecl, out: &mut String) -> fmt::Result {
    out.push_str(&decl.docs);
    writeln!(
        out,
        "#[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]"
    )?;
    if let Some(rename) = &decl.rename {
        writeln!(out, "#[serde(rename = {rename:?})]")?;
    }
    writeln!(out, "pub struct {} {{", decl.name)?;
    for field in &decl.fields {
        print_field(field, out)?;
    }
    writeln!(out, "}}")
}

fn print_field(field: &FieldDecl, out: &mut String) -> fmt::Result {
    out.push_str(&field.docs);
    if field.ty.is_optional() {
        writeln!(
            out,
            "#[serde(rename = {:?}, skip_serializing_if = \"::std::option::Option::is_none\")]",
            field.wire_name
        )?;
    } else {
        writeln!(out, "#[serde(rename = {:?})]", field.wire_name)?;
    }
    writeln!(out, "pub {}: {},", field.ident, field.ty)
}
